mod api;
mod attribute;
mod children;
mod client;
mod error;
mod file;
mod folder;
mod object;
mod shared_folder;

pub use api::{Api, ApiResponse};
pub use attribute::{Access, Attribute, Entity, Schema};
pub use children::Children;
pub use client::{AeroClient, DEFAULT_BASE_URL};
pub use error::{AeroError, ApiErrorClass};
pub use file::{ContentState, File};
pub use folder::Folder;
pub use object::{ApiObject, EntityTag};
pub use shared_folder::SharedFolder;
