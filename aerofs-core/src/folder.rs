use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::Api;
use crate::attribute::{Attribute, Entity, Schema, readonly, synced};
use crate::children::Children;
use crate::error::AeroError;
use crate::object::{ApiObject, EntityTag};
use crate::shared_folder::SharedFolder;

#[derive(Debug, Deserialize)]
struct FolderRecord {
    id: String,
    name: String,
    // absent in paths and listings
    #[serde(default)]
    parent: Option<String>,
    is_shared: bool,
    #[serde(default)]
    sid: Option<String>,
}

/// Ancestor chain returned for both files and folders.
#[derive(Debug, Deserialize)]
pub(crate) struct PathRecord {
    pub(crate) folders: Vec<Value>,
}

pub struct Folder<'a, A: ?Sized> {
    object: ApiObject<'a, A>,
    id: Option<String>,
    name: Option<String>,
    parent: Option<Box<Folder<'a, A>>>,
    is_shared: Option<bool>,
    shared_folder: Option<SharedFolder<'a, A>>,
    path: Option<Vec<Folder<'a, A>>>,
    children: Option<Children<'a, A>>,
}

impl<'a, A: Api + ?Sized> Folder<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            object: ApiObject::new(api),
            id: None,
            name: None,
            parent: None,
            is_shared: None,
            shared_folder: None,
            path: None,
            children: None,
        }
    }

    pub fn referenced(api: &'a A, id: impl Into<String>) -> Self {
        let mut folder = Self::new(api);
        folder.id = Some(id.into());
        folder
    }

    pub(crate) fn from_payload(api: &'a A, payload: &Value) -> Result<Self, AeroError> {
        let mut folder = Self::new(api);
        folder.from_json(payload)?;
        Ok(folder)
    }

    readonly!(id -> Option<&str> = |this| this.id.as_deref());
    synced!(name / set_name(String) -> Option<&str> = |this| this.name.as_deref());
    synced!(parent / set_parent(Folder<'a, A>) -> Option<&Folder<'a, A>> = |this| this.parent.as_deref());
    readonly!(is_shared -> Option<bool> = |this| this.is_shared);
    readonly!(
        /// Present exactly when the folder is shared.
        shared_folder -> Option<&SharedFolder<'a, A>> = |this| this.shared_folder.as_ref()
    );
    readonly!(
        /// Ancestors from the root down, populated by [`Folder::load_path`].
        path -> Option<&[Folder<'a, A>]> = |this| this.path.as_deref()
    );
    readonly!(
        /// Populated by [`Folder::load_children`].
        children -> Option<&Children<'a, A>> = |this| this.children.as_ref()
    );

    /// Detaches the last snapshot loaded by [`Folder::load_children`].
    pub fn take_children(&mut self) -> Option<Children<'a, A>> {
        self.children.take()
    }

    pub async fn etag(&mut self) -> Result<&EntityTag, AeroError> {
        if self.object.etag().is_unknown() {
            self.ensure_loaded().await?;
        }
        Ok(self.object.etag())
    }

    pub fn is_loaded(&self) -> bool {
        self.object.is_loaded()
    }

    pub fn from_json(&mut self, payload: &Value) -> Result<&mut Self, AeroError> {
        let record = FolderRecord::deserialize(payload)?;
        self.check_identity(&record.id)?;
        let api = self.object.api();
        let shared_folder = if record.is_shared {
            let sid = record.sid.ok_or(AeroError::MissingField("sid"))?;
            Some(SharedFolder::referenced(api, sid))
        } else {
            None
        };

        self.id = Some(record.id);
        self.name = Some(record.name);
        if let Some(parent) = record.parent {
            self.parent = Some(Box::new(Folder::referenced(api, parent)));
        }
        self.is_shared = Some(record.is_shared);
        self.shared_folder = shared_folder;
        self.object.refreshed();
        Ok(self)
    }

    pub async fn load(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let response = self.object.api().get_folder(&id).await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(folder_id = %id, etag = %self.object.etag(), "loaded folder");
        Ok(())
    }

    pub async fn load_children(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let api = self.object.api();
        let response = api.get_folder_children(&id).await?;
        let mut children = Children::new(api);
        children.from_json(&response.body)?;
        debug!(
            folder_id = %id,
            files = children.files().len(),
            folders = children.folders().len(),
            "loaded folder children"
        );
        self.children = Some(children);
        Ok(())
    }

    pub async fn load_path(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let api = self.object.api();
        let response = api.get_folder_path(&id).await?;
        let record = PathRecord::deserialize(&response.body)?;
        let path = record
            .folders
            .iter()
            .map(|folder| Folder::from_payload(api, folder))
            .collect::<Result<Vec<_>, _>>()?;
        self.path = Some(path);
        Ok(())
    }

    /// Sends the buffered name with the current parent. Values buffered on an
    /// unloaded folder are kept across the load this triggers.
    pub async fn save_name(&mut self) -> Result<(), AeroError> {
        self.save_placement().await
    }

    pub async fn save_parent(&mut self) -> Result<(), AeroError> {
        self.save_placement().await
    }

    async fn save_placement(&mut self) -> Result<(), AeroError> {
        let buffered_name = self
            .is_pending("name")
            .then(|| self.name.clone())
            .flatten();
        let buffered_parent = self
            .is_pending("parent")
            .then(|| self.parent.as_deref().and_then(|p| p.remote_id()).map(str::to_string))
            .flatten();
        self.ensure_loaded().await?;
        if let Some(name) = buffered_name {
            self.set_name(name);
        }
        if let Some(parent_id) = buffered_parent {
            self.set_parent(Folder::referenced(self.object.api(), parent_id));
        }

        let parent_id = self
            .parent()
            .await?
            .and_then(|parent| parent.remote_id())
            .ok_or(AeroError::MissingField("parent"))?
            .to_string();
        let name = self
            .name()
            .await?
            .ok_or(AeroError::MissingField("name"))?
            .to_string();
        self.move_to(&parent_id, &name, true).await
    }

    pub async fn create(&mut self, parent_id: &str, name: &str) -> Result<(), AeroError> {
        let response = self.object.api().create_folder(parent_id, name).await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(folder_id = ?self.id, parent_id, "created folder");
        Ok(())
    }

    pub async fn move_to(
        &mut self,
        parent_id: &str,
        name: &str,
        matching: bool,
    ) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let precondition = self.object.precondition(matching, EntityTag::Unknown);
        let response = self
            .object
            .api()
            .move_folder(&id, parent_id, name, &precondition)
            .await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(folder_id = %id, parent_id, %precondition, "moved folder");
        Ok(())
    }

    /// Shares the folder and reloads it; the new sharing state comes from the
    /// server, not from a local patch.
    pub async fn share(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        self.object.api().share_folder(&id).await?;
        debug!(folder_id = %id, "shared folder");
        self.load().await
    }

    /// Removes the folder remotely. The entity must not be used afterwards.
    pub async fn delete(&mut self, matching: bool) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let precondition = self.object.precondition(matching, EntityTag::Unknown);
        self.object.api().delete_folder(&id, &precondition).await?;
        debug!(folder_id = %id, %precondition, "deleted folder");
        self.object.set_etag(precondition);
        Ok(())
    }

    async fn ensure_loaded(&mut self) -> Result<(), AeroError> {
        if !self.object.is_loaded() {
            self.load().await?;
        }
        Ok(())
    }

    fn require_id(&self) -> Result<&str, AeroError> {
        self.id
            .as_deref()
            .ok_or(AeroError::MissingId { entity: "Folder" })
    }

    fn check_identity(&self, found: &str) -> Result<(), AeroError> {
        match self.id.as_deref() {
            Some(expected) if expected != found => Err(AeroError::IdentityMismatch {
                entity: "Folder",
                expected: expected.to_string(),
                found: found.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl<'a, A: Api + ?Sized> Entity for Folder<'a, A> {
    const SCHEMA: Schema = Schema::new(
        "Folder",
        &[
            Attribute::readonly_local("id"),
            Attribute::synced("name"),
            Attribute::synced("parent"),
            Attribute::readonly("is_shared"),
            Attribute::readonly("shared_folder"),
            Attribute::readonly("path"),
            Attribute::readonly("children"),
            Attribute::readonly_local("etag"),
        ],
    );

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn pending(&self) -> &BTreeSet<&'static str> {
        self.object.pending()
    }

    fn assign(&mut self, attribute: &'static Attribute, value: Value) -> Result<(), AeroError> {
        match attribute.name {
            "name" => self.set_name(serde_json::from_value(value)?),
            "parent" => {
                let parent_id: String = serde_json::from_value(value)?;
                let parent = Folder::referenced(self.object.api(), parent_id);
                self.set_parent(parent);
            }
            other => {
                return Err(AeroError::ReadOnly {
                    entity: "Folder",
                    attribute: other.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<A: ?Sized> PartialEq for Folder<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: ?Sized> Eq for Folder<'_, A> {}

impl<A: ?Sized> Hash for Folder<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A: ?Sized> fmt::Debug for Folder<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("is_shared", &self.is_shared)
            .field("shared_folder", &self.shared_folder)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}
