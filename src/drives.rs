//! Drive resolution: the default document drive of a site and named folders
//! and documents within it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SharePointConfig;
use crate::error::Error;
use crate::graph::GraphApi;
use crate::model::{Document, DriveRef, FolderNode};

pub struct DriveResolver {
    api: Arc<dyn GraphApi>,
    config: SharePointConfig,
}

impl DriveResolver {
    pub fn new(api: Arc<dyn GraphApi>, config: SharePointConfig) -> Self {
        Self { api, config }
    }

    /// Default document drive of a site, matched on the URL-encoded drive
    /// name at the end of the drive webUrl (display-name equality is not
    /// reliable across localized tenants).
    ///
    /// A transport failure here collapses to `NotFound` — long-standing
    /// behavior at this call site, locked in by tests.
    pub async fn default_drive(&self, site_id: &str) -> Result<DriveRef, Error> {
        let suffix = self.config.default_drive_url_suffix();
        let site = match self.api.get_site(site_id, true).await {
            Ok(site) => site,
            Err(err) => {
                warn!(%err, site_id, "drive lookup failed, reporting not found");
                return Err(Error::NotFound(format!("default drive on {site_id}")));
            }
        };
        for drive in site.drives.as_deref().unwrap_or_default() {
            let web_url = drive.web_url.as_deref().unwrap_or("");
            if web_url.ends_with(suffix.as_str()) {
                debug!(drive = web_url, "default drive matched");
                return Ok(DriveRef::from_drive(drive, site_id));
            }
        }
        Err(Error::NotFound(format!("default drive on {site_id}")))
    }

    pub async fn default_drive_id(&self, site_id: &str) -> Result<String, Error> {
        Ok(self.default_drive(site_id).await?.id)
    }

    /// First root child with the given name. The site id is part of the
    /// caller-facing contract but the lookup addresses the drive directly.
    pub async fn folder_id_by_name(
        &self,
        _site_id: &str,
        drive_id: &str,
        folder_name: &str,
    ) -> Result<String, Error> {
        let root = self.api.get_drive_root(drive_id).await?;
        let children = root.children.as_deref().unwrap_or_default();
        debug!(count = children.len(), drive_id, "drive root children");
        children
            .iter()
            .find(|c| c.name.as_deref() == Some(folder_name))
            .and_then(|c| c.id.clone())
            .ok_or_else(|| Error::NotFound(folder_name.to_string()))
    }

    /// First child of `folder_id` that is a folder with the given name.
    pub async fn subfolder_by_name(
        &self,
        drive_id: &str,
        folder_id: &str,
        folder_name: &str,
    ) -> Result<FolderNode, Error> {
        let page = self.api.get_children(drive_id, folder_id).await?;
        page.value
            .iter()
            .find(|c| c.name.as_deref() == Some(folder_name) && c.folder.is_some())
            .map(FolderNode::from_item)
            .ok_or_else(|| Error::NotFound(folder_name.to_string()))
    }

    /// Named document among a folder's immediate children.
    pub async fn document_by_name(
        &self,
        drive_id: &str,
        folder_id: &str,
        file_name: &str,
    ) -> Result<Document, Error> {
        let page = self.api.get_children(drive_id, folder_id).await?;
        page.value
            .iter()
            .find(|c| c.name.as_deref() == Some(file_name) && c.file.is_some())
            .map(Document::from_item)
            .ok_or_else(|| Error::NotFound(file_name.to_string()))
    }

    /// Every document among a folder's immediate children.
    pub async fn folder_documents(
        &self,
        drive_id: &str,
        folder_id: &str,
    ) -> Result<Vec<Document>, Error> {
        let page = self.api.get_children(drive_id, folder_id).await?;
        Ok(page
            .value
            .iter()
            .filter(|c| c.file.is_some())
            .map(Document::from_item)
            .collect())
    }

    /// Create a subfolder, renaming on collision.
    pub async fn create_subfolder(
        &self,
        drive_id: &str,
        parent_folder_id: &str,
        name: &str,
    ) -> Result<FolderNode, Error> {
        let item = self
            .api
            .create_folder(drive_id, parent_folder_id, name)
            .await?;
        info!(name, drive_id, "subfolder created");
        Ok(FolderNode::from_item(&item))
    }

    /// Content-based lookup through the change token. `None` when nothing
    /// matches.
    pub async fn find_document_by_ctag(
        &self,
        drive_id: &str,
        ctag: &str,
    ) -> Result<Option<Document>, Error> {
        let items = self.api.find_by_ctag(drive_id, ctag).await?;
        Ok(items.first().map(Document::from_item))
    }
}
