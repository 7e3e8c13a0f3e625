//! Graph provider seam.
//!
//! The rest of the crate consumes the remote service through the `GraphApi`
//! trait: a small verb set (site lookup/search/listing, children listing,
//! content PUT/GET, upload sessions, delete). `GraphHttpClient` is the
//! reqwest implementation; tests substitute an in-memory double.
//!
//! Retry, backoff and cancellation are transport concerns and do not live
//! here; every verb is a single request/response unit of work.

pub mod http;
pub mod wire;

#[cfg(test)]
pub(crate) mod mock;

pub use http::{GraphHttpClient, StaticTokenSource, TokenSource};
pub use wire::{
    Drive, DriveItem, FileFacet, FolderFacet, ItemPage, ItemReference, Site, SitePage,
    UploadSession,
};

use async_trait::async_trait;

use crate::error::Error;

/// Slice granularity required by Graph upload sessions (multiples of 320 KiB).
pub const UPLOAD_SLICE_SIZE: usize = 320 * 1024;

#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Keyword search for sub-sites under a parent site.
    async fn search_sites(&self, parent_site_id: &str, query: &str)
        -> Result<Vec<Site>, Error>;

    /// Fetch a site by id or server-relative path, optionally expanded with
    /// its drives.
    async fn get_site(&self, site_id_or_path: &str, expand_drives: bool)
        -> Result<Site, Error>;

    /// One page of the sub-site listing. `page_link` continues from the
    /// previous page's `@odata.nextLink`.
    async fn list_subsites(
        &self,
        parent_site_id: &str,
        page_size: u32,
        page_link: Option<&str>,
    ) -> Result<SitePage, Error>;

    /// One page of the tenant's top-level site listing.
    async fn list_sites(&self, page_size: u32, page_link: Option<&str>)
        -> Result<SitePage, Error>;

    /// Drive root item expanded with its immediate children.
    async fn get_drive_root(&self, drive_id: &str) -> Result<DriveItem, Error>;

    /// Fetch one drive item.
    async fn get_item(&self, drive_id: &str, item_id: &str) -> Result<DriveItem, Error>;

    /// One page of a folder's immediate children.
    async fn get_children(&self, drive_id: &str, item_id: &str) -> Result<ItemPage, Error>;

    /// Single-request upload of `path` under a folder, conflict policy
    /// replace. `None` when the provider returned no item.
    async fn put_content(
        &self,
        drive_id: &str,
        folder_id: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error>;

    /// Begin a resumable upload session for `path` under a folder, conflict
    /// policy replace.
    async fn create_upload_session(
        &self,
        drive_id: &str,
        folder_id: &str,
        path: &str,
    ) -> Result<UploadSession, Error>;

    /// Upload one slice at `offset`. Returns the finished item when the
    /// session completes with this slice, `None` while in progress.
    async fn put_slice(
        &self,
        session: &UploadSession,
        offset: u64,
        total: u64,
        bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error>;

    /// Download an item's content. `None` when the item has no content
    /// stream.
    async fn get_content(&self, drive_id: &str, item_id: &str)
        -> Result<Option<Vec<u8>>, Error>;

    /// Delete an item.
    async fn delete_item(&self, drive_id: &str, item_id: &str) -> Result<(), Error>;

    /// Create a subfolder under a folder, renaming on collision.
    async fn create_folder(
        &self,
        drive_id: &str,
        parent_item_id: &str,
        name: &str,
    ) -> Result<DriveItem, Error>;

    /// Items matching a change token.
    async fn find_by_ctag(&self, drive_id: &str, ctag: &str) -> Result<Vec<DriveItem>, Error>;
}
