use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, IF_MATCH};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::api::{Api, ApiResponse};
use crate::error::AeroError;
use crate::object::EntityTag;

pub const DEFAULT_BASE_URL: &str = "https://share.aerofs.com";
const API_PREFIX: &str = "/api/v1.2";

#[derive(Debug, Serialize)]
struct Placement<'a> {
    parent: &'a str,
    name: &'a str,
}

/// [`Api`] over HTTPS, authenticated with a bearer access token.
#[derive(Clone)]
pub struct AeroClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl AeroClient {
    pub fn new(token: impl Into<String>) -> Result<Self, AeroError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    pub fn with_base_url(base_url: &str, token: impl Into<String>) -> Result<Self, AeroError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: token.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AeroError> {
        Ok(self.base_url.join(&format!("{API_PREFIX}{path}"))?)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.http
            .get(url)
            .header("Authorization", self.auth_header_value())
    }

    async fn fetch_json(&self, path: &str) -> Result<ApiResponse<Value>, AeroError> {
        let url = self.endpoint(path)?;
        let response = self.get(url).send().await?;
        Self::handle_json(response).await
    }

    fn with_precondition(request: RequestBuilder, if_match: &EntityTag) -> RequestBuilder {
        match if_match.if_match() {
            Some(tag) => request.header(IF_MATCH, tag),
            None => request,
        }
    }

    async fn check_status(response: Response) -> Result<Response, AeroError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "api call rejected");
            Err(AeroError::Api { status, body })
        }
    }

    async fn handle_json(response: Response) -> Result<ApiResponse<Value>, AeroError> {
        let response = Self::check_status(response).await?;
        let headers = response.headers().clone();
        let body = response.json::<Value>().await?;
        Ok(ApiResponse::new(body, headers))
    }

    async fn handle_empty(response: Response) -> Result<ApiResponse<()>, AeroError> {
        let response = Self::check_status(response).await?;
        Ok(ApiResponse::new((), response.headers().clone()))
    }
}

#[async_trait]
impl Api for AeroClient {
    #[instrument(skip(self), level = "debug")]
    async fn get_file(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.fetch_json(&format!("/files/{file_id}")).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_file_content(&self, file_id: &str) -> Result<ApiResponse<Vec<u8>>, AeroError> {
        let url = self.endpoint(&format!("/files/{file_id}/content"))?;
        let response = Self::check_status(self.get(url).send().await?).await?;
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        Ok(ApiResponse::new(bytes.to_vec(), headers))
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_file_path(&self, file_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.fetch_json(&format!("/files/{file_id}/path")).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_folder(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.fetch_json(&format!("/folders/{folder_id}")).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_folder_children(
        &self,
        folder_id: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        self.fetch_json(&format!("/folders/{folder_id}/children"))
            .await
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_folder_path(&self, folder_id: &str) -> Result<ApiResponse<Value>, AeroError> {
        self.fetch_json(&format!("/folders/{folder_id}/path")).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_file(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        let url = self.endpoint("/files")?;
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .json(&Placement {
                parent: parent_id,
                name,
            })
            .send()
            .await?;
        Self::handle_json(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn create_folder(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<ApiResponse<Value>, AeroError> {
        let url = self.endpoint("/folders")?;
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .json(&Placement {
                parent: parent_id,
                name,
            })
            .send()
            .await?;
        Self::handle_json(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn move_file(
        &self,
        file_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError> {
        let url = self.endpoint(&format!("/files/{file_id}"))?;
        let request = self
            .http
            .put(url)
            .header("Authorization", self.auth_header_value())
            .json(&Placement {
                parent: parent_id,
                name,
            });
        let response = Self::with_precondition(request, if_match).send().await?;
        Self::handle_json(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn move_folder(
        &self,
        folder_id: &str,
        parent_id: &str,
        name: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<Value>, AeroError> {
        let url = self.endpoint(&format!("/folders/{folder_id}"))?;
        let request = self
            .http
            .put(url)
            .header("Authorization", self.auth_header_value())
            .json(&Placement {
                parent: parent_id,
                name,
            });
        let response = Self::with_precondition(request, if_match).send().await?;
        Self::handle_json(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_file(
        &self,
        file_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        let url = self.endpoint(&format!("/files/{file_id}"))?;
        let request = self
            .http
            .delete(url)
            .header("Authorization", self.auth_header_value());
        let response = Self::with_precondition(request, if_match).send().await?;
        Self::handle_empty(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_folder(
        &self,
        folder_id: &str,
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        let url = self.endpoint(&format!("/folders/{folder_id}"))?;
        let request = self
            .http
            .delete(url)
            .header("Authorization", self.auth_header_value());
        let response = Self::with_precondition(request, if_match).send().await?;
        Self::handle_empty(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn share_folder(&self, folder_id: &str) -> Result<ApiResponse<()>, AeroError> {
        let url = self.endpoint(&format!("/folders/{folder_id}/is_shared"))?;
        let response = self
            .http
            .put(url)
            .header("Authorization", self.auth_header_value())
            .send()
            .await?;
        Self::handle_empty(response).await
    }

    #[instrument(skip(self, content), level = "debug", fields(content_len = content.len()))]
    async fn upload_file_content(
        &self,
        file_id: &str,
        content: &[u8],
        if_match: &EntityTag,
    ) -> Result<ApiResponse<()>, AeroError> {
        let url = self.endpoint(&format!("/files/{file_id}/content"))?;
        let request = self
            .http
            .put(url)
            .header("Authorization", self.auth_header_value())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec());
        let response = Self::with_precondition(request, if_match).send().await?;
        Self::handle_empty(response).await
    }
}
