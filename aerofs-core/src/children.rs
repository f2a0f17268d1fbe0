use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::api::Api;
use crate::attribute::{Attribute, Entity, Schema};
use crate::error::AeroError;
use crate::file::File;
use crate::folder::Folder;
use crate::object::ApiObject;

#[derive(Debug, Deserialize)]
struct ChildrenRecord {
    files: Vec<Value>,
    folders: Vec<Value>,
}

/// Read-only snapshot of a folder's direct children.
pub struct Children<'a, A: ?Sized> {
    object: ApiObject<'a, A>,
    files: HashSet<File<'a, A>>,
    folders: HashSet<Folder<'a, A>>,
}

impl<'a, A: Api + ?Sized> Children<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            object: ApiObject::new(api),
            files: HashSet::new(),
            folders: HashSet::new(),
        }
    }

    pub fn files(&self) -> &HashSet<File<'a, A>> {
        &self.files
    }

    pub fn folders(&self) -> &HashSet<Folder<'a, A>> {
        &self.folders
    }

    pub fn into_parts(self) -> (HashSet<File<'a, A>>, HashSet<Folder<'a, A>>) {
        (self.files, self.folders)
    }

    /// Listings have no endpoint of their own; they only come from
    /// [`Folder::load_children`].
    pub async fn load(&mut self) -> Result<(), AeroError> {
        Ok(())
    }

    pub fn from_json(&mut self, payload: &Value) -> Result<&mut Self, AeroError> {
        let record = ChildrenRecord::deserialize(payload)?;
        let api = self.object.api();
        let files = record
            .files
            .iter()
            .map(|file| File::from_payload(api, file))
            .collect::<Result<HashSet<_>, _>>()?;
        let folders = record
            .folders
            .iter()
            .map(|folder| Folder::from_payload(api, folder))
            .collect::<Result<HashSet<_>, _>>()?;
        self.files = files;
        self.folders = folders;
        self.object.refreshed();
        Ok(self)
    }
}

impl<'a, A: Api + ?Sized> Entity for Children<'a, A> {
    const SCHEMA: Schema = Schema::new(
        "Children",
        &[
            Attribute::readonly_local("files"),
            Attribute::readonly_local("folders"),
        ],
    );

    fn remote_id(&self) -> Option<&str> {
        None
    }

    fn pending(&self) -> &BTreeSet<&'static str> {
        self.object.pending()
    }

    fn assign(&mut self, attribute: &'static Attribute, _value: Value) -> Result<(), AeroError> {
        Err(AeroError::ReadOnly {
            entity: "Children",
            attribute: attribute.name.to_string(),
        })
    }
}

impl<A: ?Sized> fmt::Debug for Children<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Children")
            .field("files", &self.files)
            .field("folders", &self.folders)
            .finish()
    }
}
