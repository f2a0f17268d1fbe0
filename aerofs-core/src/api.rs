use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::AeroError;
use crate::object::EntityTag;

/// Body of a successful call together with the response headers it came with.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub body: T,
    pub headers: HeaderMap,
}

impl<T> ApiResponse<T> {
    pub fn new(body: T, headers: HeaderMap) -> Self {
        Self { body, headers }
    }

    pub fn header(&self, name: &'static str) -> Result<&str, AeroError> {
        let value = self
            .headers
            .get(name)
            .ok_or(AeroError::MissingHeader(name))?;
        value.to_str().map_err(|_| AeroError::InvalidHeader(name))
    }

    pub fn etag(&self) -> Result<EntityTag, AeroError> {
        Ok(EntityTag::Known(self.header("ETag")?.to_string()))
    }

    pub fn content_type(&self) -> Result<&str, AeroError> {
        self.header("Content-Type")
    }
}

/// Remote operations the entity model is built on.
///
/// Write operations receive the entity's cached tag; implementations send it
/// as `If-Match` only when it is [`EntityTag::Known`].
#[async_trait]
pub trait Api: Send + Sync {
    async fn get_file(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError>;

    async fn get_file_content(&self, file_id: &str) -> Result<ApiResponse<Vec<u8>>, AeroError>;

    async fn get_file_path(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError>;

    async fn get_folder(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError>;

    async fn get_folder_children(
        &self,
        folder_id: &str,
    ) -> Result<ApiResponse<Value>, AeroError>;

    async fn get_folder_path(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError>;

    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError>;

    async fn create_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError>;

    async fn move_file(
        &self,
        file_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError>;

    async fn move_folder(
        &self,
        folder_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError>;

    async fn delete_file(
        &self,
        file_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError>;

    async fn delete_folder(
        &self,
        folder_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError>;

    async fn share_folder(&self, folder_id: &str) -> Result<ApiResponse<()>, AeroError>;

    async fn upload_file_content(
        &self,
        file_id: &str,
        content: &[u8],
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError>;
}
