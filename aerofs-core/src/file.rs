use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::Api;
use crate::attribute::{Attribute, Entity, Schema, readonly, synced};
use crate::error::AeroError;
use crate::folder::{Folder, PathRecord};
use crate::object::{ApiObject, EntityTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentState {
    Available,
    Syncing,
    Deselected,
    InsufficientStorage,
}

impl ContentState {
    /// Missing values fail the same lookup as unrecognised ones.
    fn from_wire(value: Option<&str>) -> Result<Self, AeroError> {
        value.ok_or(AeroError::UnknownContentState(None))?.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentState::Available => "AVAILABLE",
            ContentState::Syncing => "SYNCING",
            ContentState::Deselected => "DESELECTED",
            ContentState::InsufficientStorage => "INSUFFICIENT_STORAGE",
        }
    }
}

impl FromStr for ContentState {
    type Err = AeroError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "AVAILABLE" => Ok(ContentState::Available),
            "SYNCING" => Ok(ContentState::Syncing),
            "DESELECTED" => Ok(ContentState::Deselected),
            "INSUFFICIENT_STORAGE" => Ok(ContentState::InsufficientStorage),
            other => Err(AeroError::UnknownContentState(Some(other.to_string()))),
        }
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct FileRecord {
    id: String,
    name: String,
    // absent in folder listings
    #[serde(default)]
    parent: Option<String>,
    // absent on empty files
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    mime_type: String,
    #[serde(default)]
    content_state: Option<String>,
}

pub struct File<'a, A: ?Sized> {
    object: ApiObject<'a, A>,
    id: Option<String>,
    name: Option<String>,
    parent: Option<Folder<'a, A>>,
    last_modified: Option<String>,
    size: Option<u64>,
    mime_type: Option<String>,
    path: Option<Vec<Folder<'a, A>>>,
    content: Option<Vec<u8>>,
    content_state: Option<ContentState>,
}

impl<'a, A: Api + ?Sized> File<'a, A> {
    /// An entity with no remote counterpart yet; see [`File::create`].
    pub fn new(api: &'a A) -> Self {
        Self {
            object: ApiObject::new(api),
            id: None,
            name: None,
            parent: None,
            last_modified: None,
            size: None,
            mime_type: None,
            path: None,
            content: None,
            content_state: None,
        }
    }

    /// An unloaded reference to an existing file.
    pub fn referenced(api: &'a A, id: impl Into<String>) -> Self {
        let mut file = Self::new(api);
        file.id = Some(id.into());
        file
    }

    pub(crate) fn from_payload(api: &'a A, payload: &Value) -> Result<Self, AeroError> {
        let mut file = Self::new(api);
        file.from_json(payload)?;
        Ok(file)
    }

    readonly!(id -> Option<&str> = |this| this.id.as_deref());
    synced!(name / set_name(String) -> Option<&str> = |this| this.name.as_deref());
    synced!(parent / set_parent(Folder<'a, A>) -> Option<&Folder<'a, A>> = |this| this.parent.as_ref());
    readonly!(last_modified -> Option<&str> = |this| this.last_modified.as_deref());
    readonly!(size -> Option<u64> = |this| this.size);
    readonly!(mime_type -> Option<&str> = |this| this.mime_type.as_deref());
    readonly!(
        /// Populated by [`File::load_path`].
        path -> Option<&[Folder<'a, A>]> = |this| this.path.as_deref()
    );
    synced!(
        /// Populated by [`File::load_content`].
        content / set_content(Vec<u8>) -> Option<&[u8]> = |this| this.content.as_deref()
    );
    readonly!(content_state -> Option<ContentState> = |this| this.content_state);

    pub async fn etag(&mut self) -> Result<&EntityTag, AeroError> {
        if self.object.etag().is_unknown() {
            self.ensure_loaded().await?;
        }
        Ok(self.object.etag())
    }

    pub fn is_loaded(&self) -> bool {
        self.object.is_loaded()
    }

    /// Replaces the local record with `payload` and forgets pending changes.
    pub fn from_json(&mut self, payload: &Value) -> Result<&mut Self, AeroError> {
        let record = FileRecord::deserialize(payload)?;
        let content_state = ContentState::from_wire(record.content_state.as_deref())?;
        self.check_identity(&record.id)?;

        let api = self.object.api();
        self.id = Some(record.id);
        self.name = Some(record.name);
        if let Some(parent) = record.parent {
            self.parent = Some(Folder::referenced(api, parent));
        }
        self.last_modified = record.last_modified;
        self.size = record.size;
        self.mime_type = Some(record.mime_type);
        self.content_state = Some(content_state);
        self.object.refreshed();
        Ok(self)
    }

    pub async fn load(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let response = self.object.api().get_file(&id).await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(file_id = %id, etag = %self.object.etag(), "loaded file");
        Ok(())
    }

    /// Fetches the raw content. Only `mime_type` and the tag are refreshed
    /// alongside it.
    pub async fn load_content(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let response = self.object.api().get_file_content(&id).await?;
        let mime_type = response.content_type()?.to_string();
        let etag = response.etag()?;
        debug!(file_id = %id, bytes = response.body.len(), "loaded file content");
        self.content = Some(response.body);
        self.mime_type = Some(mime_type);
        self.object.set_etag(etag);
        Ok(())
    }

    pub async fn load_path(&mut self) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let api = self.object.api();
        let response = api.get_file_path(&id).await?;
        let record = PathRecord::deserialize(&response.body)?;
        let path = record
            .folders
            .iter()
            .map(|folder| Folder::from_payload(api, folder))
            .collect::<Result<Vec<_>, _>>()?;
        self.path = Some(path);
        Ok(())
    }

    /// Uploads the buffered content, then reloads metadata.
    ///
    /// Without `matching` the cached tag is discarded and the upload
    /// overwrites whatever the server holds.
    pub async fn save_content(&mut self, matching: bool) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let precondition = self.object.precondition(matching, EntityTag::Unconditional);
        let content = self
            .content
            .as_deref()
            .ok_or(AeroError::MissingField("content"))?;
        self.object
            .api()
            .upload_file_content(&id, content, &precondition)
            .await?;
        debug!(file_id = %id, %precondition, "uploaded file content");
        self.object.set_etag(precondition);
        self.load().await
    }

    /// Sends the buffered name together with the current parent, conditional
    /// on the cached tag. An unloaded file is loaded first; the buffered value
    /// survives that load.
    pub async fn save_name(&mut self) -> Result<(), AeroError> {
        self.save_placement().await
    }

    /// Counterpart of [`File::save_name`] for a buffered parent.
    pub async fn save_parent(&mut self) -> Result<(), AeroError> {
        self.save_placement().await
    }

    // Renames and moves are the same remote call carrying both values.
    async fn save_placement(&mut self) -> Result<(), AeroError> {
        let buffered_name = self
            .is_pending("name")
            .then(|| self.name.clone())
            .flatten();
        let buffered_parent = self
            .is_pending("parent")
            .then(|| self.parent.as_ref().and_then(|p| p.remote_id()).map(str::to_string))
            .flatten();
        // a first load replaces the whole record
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
        let response = self.object.api().create_file(parent_id, name).await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(file_id = ?self.id, parent_id, "created file");
        Ok(())
    }

    /// Moves and/or renames the file. Without `matching` the write is sent
    /// with no precondition.
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
            .move_file(&id, parent_id, name, &precondition)
            .await?;
        let etag = response.etag()?;
        self.from_json(&response.body)?;
        self.object.set_etag(etag);
        debug!(file_id = %id, parent_id, %precondition, "moved file");
        Ok(())
    }

    /// Removes the file remotely. The entity must not be used afterwards.
    pub async fn delete(&mut self, matching: bool) -> Result<(), AeroError> {
        let id = self.require_id()?.to_string();
        let precondition = self.object.precondition(matching, EntityTag::Unknown);
        self.object.api().delete_file(&id, &precondition).await?;
        debug!(file_id = %id, %precondition, "deleted file");
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
        self.id.as_deref().ok_or(AeroError::MissingId { entity: "File" })
    }

    fn check_identity(&self, found: &str) -> Result<(), AeroError> {
        match self.id.as_deref() {
            Some(expected) if expected != found => Err(AeroError::IdentityMismatch {
                entity: "File",
                expected: expected.to_string(),
                found: found.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl<'a, A: Api + ?Sized> Entity for File<'a, A> {
    const SCHEMA: Schema = Schema::new(
        "File",
        &[
            Attribute::readonly_local("id"),
            Attribute::synced("name"),
            Attribute::synced("parent"),
            Attribute::readonly("last_modified"),
            Attribute::readonly("size"),
            Attribute::readonly("mime_type"),
            Attribute::readonly("path"),
            Attribute::synced("content"),
            Attribute::readonly("content_state"),
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
            "content" => self.set_content(serde_json::from_value(value)?),
            other => {
                return Err(AeroError::ReadOnly {
                    entity: "File",
                    attribute: other.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<A: ?Sized> PartialEq for File<'_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A: ?Sized> Eq for File<'_, A> {}

impl<A: ?Sized> Hash for File<'_, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<A: ?Sized> fmt::Debug for File<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("last_modified", &self.last_modified)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .field("content_state", &self.content_state)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}
