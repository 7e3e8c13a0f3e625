//! reqwest implementation of the Graph verb set.
//!
//! Token acquisition is external: callers hand in a `TokenSource` and this
//! client only attaches the bearer header per request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::wire::{DriveItem, ItemPage, Site, SitePage, UploadSession};
use super::GraphApi;
use crate::error::Error;

/// Microsoft Graph API base URL
const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Source of valid bearer tokens for the Graph API.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<SecretString, Error>;
}

/// Fixed token handed in by the caller (e.g. from a daemon-app client
/// credentials grant performed elsewhere).
pub struct StaticTokenSource {
    token: SecretString,
}

impl StaticTokenSource {
    pub fn new(token: &str) -> Self {
        Self {
            token: SecretString::from(token.to_string()),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn bearer_token(&self) -> Result<SecretString, Error> {
        Ok(self.token.clone())
    }
}

pub struct GraphHttpClient {
    client: reqwest::Client,
    tokens: Arc<dyn TokenSource>,
    base_url: String,
}

impl GraphHttpClient {
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_base_url(tokens, GRAPH_API_BASE)
    }

    /// Custom base URL for sovereign clouds and tests.
    pub fn with_base_url(tokens: Arc<dyn TokenSource>, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn auth_header(&self) -> Result<HeaderValue, Error> {
        let token = self.tokens.bearer_token().await?;
        HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Transport(format!("invalid token: {e}")))
    }

    fn site_url(&self, site: &str) -> String {
        format!("{}/sites/{}", self.base_url, site)
    }

    fn item_url(&self, drive_id: &str, item_id: &str) -> String {
        format!("{}/drives/{}/items/{}", self.base_url, drive_id, item_id)
    }

    /// Path-addressed item under a folder:
    /// `/drives/{id}/items/{folder}:/{path}:`
    fn path_url(&self, drive_id: &str, folder_id: &str, path: &str) -> String {
        format!(
            "{}/drives/{}/items/{}:/{}:",
            self.base_url,
            drive_id,
            folder_id,
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, Error> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.auth_header().await?)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(Error::NotFound(what.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("{what}: {status}: {text}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("{what}: {e}")))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: serde_json::Value,
        what: &str,
    ) -> Result<T, Error> {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.auth_header().await?)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(Error::NotFound(what.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("{what}: {status}: {text}")));
        }
        response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("{what}: {e}")))
    }
}

/// Content-Range header value for one upload slice.
fn content_range(offset: u64, len: usize, total: u64) -> String {
    format!("bytes {}-{}/{}", offset, offset + len as u64 - 1, total)
}

#[async_trait]
impl GraphApi for GraphHttpClient {
    async fn search_sites(
        &self,
        parent_site_id: &str,
        query: &str,
    ) -> Result<Vec<Site>, Error> {
        let url = format!(
            "{}/sites?search={}",
            self.site_url(parent_site_id),
            urlencoding::encode(query)
        );
        let page: SitePage = self.get_json(&url, "site search").await?;
        Ok(page.value)
    }

    async fn get_site(
        &self,
        site_id_or_path: &str,
        expand_drives: bool,
    ) -> Result<Site, Error> {
        let mut url = self.site_url(site_id_or_path);
        if expand_drives {
            url.push_str("?$expand=drives");
        }
        self.get_json(&url, site_id_or_path).await
    }

    async fn list_subsites(
        &self,
        parent_site_id: &str,
        page_size: u32,
        page_link: Option<&str>,
    ) -> Result<SitePage, Error> {
        let url = match page_link {
            Some(link) => link.to_string(),
            None => format!(
                "{}/sites?$top={}&$select=id,name,displayName,webUrl",
                self.site_url(parent_site_id),
                page_size
            ),
        };
        self.get_json(&url, "subsites").await
    }

    async fn list_sites(
        &self,
        page_size: u32,
        page_link: Option<&str>,
    ) -> Result<SitePage, Error> {
        let url = match page_link {
            Some(link) => link.to_string(),
            None => format!("{}/sites?$top={}", self.base_url, page_size),
        };
        self.get_json(&url, "sites").await
    }

    async fn get_drive_root(&self, drive_id: &str) -> Result<DriveItem, Error> {
        let url = format!(
            "{}/drives/{}/root?$expand=children",
            self.base_url, drive_id
        );
        self.get_json(&url, "drive root").await
    }

    async fn get_item(&self, drive_id: &str, item_id: &str) -> Result<DriveItem, Error> {
        self.get_json(&self.item_url(drive_id, item_id), item_id).await
    }

    async fn get_children(&self, drive_id: &str, item_id: &str) -> Result<ItemPage, Error> {
        let url = format!("{}/children", self.item_url(drive_id, item_id));
        self.get_json(&url, "children").await
    }

    async fn put_content(
        &self,
        drive_id: &str,
        folder_id: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error> {
        let url = format!(
            "{}/content?@microsoft.graph.conflictBehavior=replace",
            self.path_url(drive_id, folder_id, path)
        );
        debug!(url, size = bytes.len(), "PUT content");
        let response = self
            .client
            .put(&url)
            .header(AUTHORIZATION, self.auth_header().await?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(Error::NotFound(path.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("upload {path}: {status}: {text}")));
        }
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if text.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Parse(format!("uploaded item: {e}")))
    }

    async fn create_upload_session(
        &self,
        drive_id: &str,
        folder_id: &str,
        path: &str,
    ) -> Result<UploadSession, Error> {
        let url = format!(
            "{}/createUploadSession",
            self.path_url(drive_id, folder_id, path)
        );
        let body = serde_json::json!({
            "item": { "@microsoft.graph.conflictBehavior": "replace" }
        });
        self.post_json(&url, body, "upload session").await
    }

    async fn put_slice(
        &self,
        session: &UploadSession,
        offset: u64,
        total: u64,
        bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidArgument("empty upload slice".to_string()));
        }
        let range = content_range(offset, bytes.len(), total);
        // The session URL is pre-authenticated; no bearer header.
        let response = self
            .client
            .put(&session.upload_url)
            .header("Content-Range", &range)
            .header(CONTENT_LENGTH, bytes.len().to_string())
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 202 {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::UploadFailed(format!("slice {range}: {status}: {text}")));
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| Error::Parse(format!("uploaded item: {e}")))
    }

    async fn get_content(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Option<Vec<u8>>, Error> {
        let url = format!("{}/content", self.item_url(drive_id, item_id));
        debug!(url, "GET content");
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth_header().await?)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        match response.status().as_u16() {
            404 | 204 => return Ok(None),
            _ => {}
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("content {item_id}: {status}: {text}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    async fn delete_item(&self, drive_id: &str, item_id: &str) -> Result<(), Error> {
        let url = self.item_url(drive_id, item_id);
        debug!(url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .header(AUTHORIZATION, self.auth_header().await?)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("delete {item_id}: {status}: {text}")));
        }
        Ok(())
    }

    async fn create_folder(
        &self,
        drive_id: &str,
        parent_item_id: &str,
        name: &str,
    ) -> Result<DriveItem, Error> {
        let url = format!("{}/children", self.item_url(drive_id, parent_item_id));
        let body = serde_json::json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": "rename"
        });
        self.post_json(&url, body, name).await
    }

    async fn find_by_ctag(&self, drive_id: &str, ctag: &str) -> Result<Vec<DriveItem>, Error> {
        let filter = format!("cTag eq '{ctag}'");
        let url = format!(
            "{}/drives/{}/items?$filter={}",
            self.base_url,
            drive_id,
            urlencoding::encode(&filter)
        );
        let page: ItemPage = self.get_json(&url, "ctag lookup").await?;
        Ok(page.value)
    }
}
