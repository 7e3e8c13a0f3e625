//! Client configuration.

/// Display name of the document drive every site carries by convention.
pub const DEFAULT_DRIVE_NAME: &str = "Shared Documents";

/// Uploads below this size go through a single PUT; everything else uses an
/// upload session. Kept configurable because the historical default is far
/// below the provider's real small-file ceiling.
pub const DEFAULT_SMALL_FILE_THRESHOLD: u64 = 4096;

/// Folder-tree mapping depth bound.
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Page size used when enumerating sub-sites.
pub const DEFAULT_SUBSITE_PAGE_SIZE: u32 = 400;

#[derive(Debug, Clone)]
pub struct SharePointConfig {
    /// Tenant host, e.g. "contoso.sharepoint.com".
    pub base_host: String,
    /// Name of the folder under the default drive root that documents are
    /// filed beneath.
    pub base_folder: String,
    /// Display name of the default document drive.
    pub default_drive_name: String,
    pub small_file_threshold: u64,
    pub max_depth: u32,
    pub subsite_page_size: u32,
}

impl SharePointConfig {
    pub fn new(base_host: &str, base_folder: &str) -> Self {
        Self {
            base_host: base_host.trim_end_matches('/').to_string(),
            base_folder: base_folder.to_string(),
            default_drive_name: DEFAULT_DRIVE_NAME.to_string(),
            small_file_threshold: DEFAULT_SMALL_FILE_THRESHOLD,
            max_depth: DEFAULT_MAX_DEPTH,
            subsite_page_size: DEFAULT_SUBSITE_PAGE_SIZE,
        }
    }

    /// Server-relative site path accepted by the Graph sites endpoint,
    /// e.g. "contoso.sharepoint.com:/sites/Finance/".
    pub fn site_path(&self, site_name: &str) -> String {
        format!("{}:/sites/{}/", self.base_host, site_name)
    }

    /// URL-encoded form of the default drive name. Drive display names are
    /// not reliable across localized tenants; the encoded name at the end of
    /// a drive webUrl is the stable signal.
    pub fn default_drive_url_suffix(&self) -> String {
        urlencoding::encode(&self.default_drive_name).into_owned()
    }
}

impl Default for SharePointConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}
