//! Upload, download and deletion of documents.
//!
//! Small payloads go up in a single request; anything at or above the
//! configured threshold goes through an upload session in fixed-size slices
//! with cumulative progress reporting.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Error;
use crate::graph::wire::DriveItem;
use crate::graph::{GraphApi, UPLOAD_SLICE_SIZE};
use crate::model::Document;

/// Called after each committed slice with `(bytes_sent_so_far, total)`.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send + Sync>;

pub struct TransferEngine {
    api: Arc<dyn GraphApi>,
    small_file_threshold: u64,
}

impl TransferEngine {
    pub fn new(api: Arc<dyn GraphApi>, small_file_threshold: u64) -> Self {
        Self {
            api,
            small_file_threshold,
        }
    }

    /// Upload `bytes` as `file_name` under `folder_id`, replacing any
    /// existing document of that name.
    pub async fn upload(
        &self,
        drive_id: &str,
        folder_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        progress: Option<ProgressFn>,
    ) -> Result<Document, Error> {
        let total = bytes.len() as u64;
        let item = if total < self.small_file_threshold {
            debug!(file_name, total, "single-request upload");
            self.api
                .put_content(drive_id, folder_id, file_name, bytes)
                .await?
        } else {
            self.upload_with_session(drive_id, folder_id, file_name, bytes, progress)
                .await?
        };
        let item = item.ok_or(Error::UploadEmpty)?;
        info!(file_name, total, "upload complete");
        Ok(Document::from_item(&item))
    }

    async fn upload_with_session(
        &self,
        drive_id: &str,
        folder_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        progress: Option<ProgressFn>,
    ) -> Result<Option<DriveItem>, Error> {
        let session = self
            .api
            .create_upload_session(drive_id, folder_id, file_name)
            .await?;
        let total = bytes.len() as u64;
        debug!(file_name, total, slice = UPLOAD_SLICE_SIZE, "session upload");
        let mut result = None;
        let mut offset = 0usize;
        while offset < bytes.len() {
            let end = (offset + UPLOAD_SLICE_SIZE).min(bytes.len());
            let slice = bytes[offset..end].to_vec();
            if let Some(item) = self
                .api
                .put_slice(&session, offset as u64, total, slice)
                .await?
            {
                result = Some(item);
            }
            offset = end;
            if let Some(report) = progress.as_ref() {
                report(offset as u64, total);
            }
        }
        Ok(result)
    }

    /// Fetch a document's content. The folder id is accepted for call-site
    /// symmetry with upload but the item id alone addresses the document.
    pub async fn download(
        &self,
        drive_id: &str,
        _folder_id: &str,
        document_id: &str,
    ) -> Result<Option<Vec<u8>>, Error> {
        self.api.get_content(drive_id, document_id).await
    }

    /// Delete a document. Blank ids are rejected before any traffic.
    pub async fn delete(&self, drive_id: &str, document_id: &str) -> Result<(), Error> {
        if drive_id.trim().is_empty() {
            return Err(Error::InvalidArgument("blank drive id".to_string()));
        }
        if document_id.trim().is_empty() {
            return Err(Error::InvalidArgument("blank document id".to_string()));
        }
        self.api.delete_item(drive_id, document_id).await?;
        info!(document_id, "document deleted");
        Ok(())
    }

    /// Short-lived direct download URL for a document among a folder's
    /// children, addressed by item id, or the empty string when the document
    /// or its URL is absent.
    pub async fn download_url(
        &self,
        drive_id: &str,
        folder_id: &str,
        document_id: &str,
    ) -> Result<String, Error> {
        let page = self.api.get_children(drive_id, folder_id).await?;
        let url = page
            .value
            .iter()
            .find(|c| c.id.as_deref() == Some(document_id) && c.file.is_some())
            .map(|c| Document::from_item(c).download_url)
            .unwrap_or_default();
        Ok(url)
    }
}
