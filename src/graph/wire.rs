//! Microsoft Graph wire types (the fields this client reads).

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// SharePoint site, optionally expanded with its drives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Site {
    pub id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub web_url: Option<String>,
    pub drives: Option<Vec<Drive>>,
}

impl Site {
    /// Display name used for exact-name matching. Graph fills `name` for
    /// most sites; search results sometimes carry only `displayName`.
    pub fn effective_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.display_name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Drive {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
    pub created_by: Option<IdentitySet>,
    pub created_date_time: Option<DateTime<FixedOffset>>,
    pub last_modified_by: Option<IdentitySet>,
    pub last_modified_date_time: Option<DateTime<FixedOffset>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentitySet {
    pub user: Option<Identity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    pub display_name: Option<String>,
}

impl IdentitySet {
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.display_name.clone())
            .unwrap_or_default()
    }
}

/// Drive item: a folder or a document, classified by its facets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriveItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub web_url: Option<String>,
    pub e_tag: Option<String>,
    pub c_tag: Option<String>,
    pub size: Option<u64>,
    pub description: Option<String>,
    pub created_by: Option<IdentitySet>,
    pub created_date_time: Option<DateTime<FixedOffset>>,
    pub last_modified_by: Option<IdentitySet>,
    pub last_modified_date_time: Option<DateTime<FixedOffset>>,
    pub parent_reference: Option<ItemReference>,
    pub folder: Option<FolderFacet>,
    pub file: Option<FileFacet>,
    /// Present when the item was fetched with `$expand=children`.
    pub children: Option<Vec<DriveItem>>,
    /// Ephemeral pre-authenticated content URL.
    #[serde(rename = "@microsoft.graph.downloadUrl")]
    pub download_url: Option<String>,
    /// Legacy spelling of the same side-channel field.
    #[serde(rename = "@content.downloadUrl")]
    pub content_download_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderFacet {
    pub child_count: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileFacet {
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemReference {
    pub drive_id: Option<String>,
    pub id: Option<String>,
    pub site_id: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
}

/// One page of a site listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitePage {
    #[serde(default)]
    pub value: Vec<Site>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// One page of a children listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub value: Vec<DriveItem>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Resumable upload session. The upload URL is pre-authenticated; slices are
/// PUT against it without a bearer header.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadSession {
    pub upload_url: String,
    pub expiration_date_time: Option<DateTime<FixedOffset>>,
    pub next_expected_ranges: Option<Vec<String>>,
}
