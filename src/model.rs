//! Filesystem-shaped views over Graph objects. Pure data, no I/O.
//!
//! `FolderNode` trees are populated by one mapping traversal and owned top
//! down: each node belongs to its parent, with no sharing or back-references
//! beyond the informational `parent_reference` string. Re-running a traversal
//! against the same node appends, so nodes are single-use per traversal.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::graph::wire::{Drive, DriveItem, Site};

/// Resolved site (top-level or sub-site).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRef {
    pub id: String,
    pub name: String,
    pub web_url: String,
    pub parent_site_id: Option<String>,
}

impl SiteRef {
    pub fn from_site(site: &Site, parent_site_id: Option<&str>) -> Self {
        Self {
            id: site.id.clone().unwrap_or_default(),
            name: site.effective_name().to_string(),
            web_url: site.web_url.clone().unwrap_or_default(),
            parent_site_id: parent_site_id.map(str::to_string),
        }
    }
}

/// Resolved document drive, scoped to its owning site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveRef {
    pub id: String,
    pub name: String,
    pub web_url: String,
    pub site_id: String,
}

impl DriveRef {
    pub fn from_drive(drive: &Drive, site_id: &str) -> Self {
        Self {
            id: drive.id.clone().unwrap_or_default(),
            name: drive.name.clone().unwrap_or_default(),
            web_url: drive.web_url.clone().unwrap_or_default(),
            site_id: site_id.to_string(),
        }
    }
}

/// Folder with its child folders and documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub web_url: String,
    pub created_by: String,
    pub created_date_time: Option<DateTime<FixedOffset>>,
    pub last_modified_by: String,
    pub last_modified_date_time: Option<DateTime<FixedOffset>>,
    /// "id:{driveId},name:{parentName}" — informational only.
    pub parent_reference: String,
    pub child_folders: Vec<FolderNode>,
    pub documents: Vec<Document>,
    pub has_child_folders: bool,
    pub has_documents: bool,
}

impl FolderNode {
    pub fn from_item(item: &DriveItem) -> Self {
        Self {
            id: item.id.clone().unwrap_or_default(),
            name: item.name.clone().unwrap_or_default(),
            web_url: item.web_url.clone().unwrap_or_default(),
            created_by: item
                .created_by
                .as_ref()
                .map(|i| i.display_name())
                .unwrap_or_default(),
            created_date_time: item.created_date_time,
            last_modified_by: item
                .last_modified_by
                .as_ref()
                .map(|i| i.display_name())
                .unwrap_or_default(),
            last_modified_date_time: item.last_modified_date_time,
            parent_reference: parent_reference_of(
                item.parent_reference.as_ref().and_then(|r| r.drive_id.as_deref()),
                item.parent_reference.as_ref().and_then(|r| r.name.as_deref()),
            ),
            ..Default::default()
        }
    }

    /// Monotonic add: `has_documents` is set on first add and never reset.
    pub fn add_document(&mut self, doc: Document) {
        self.documents.push(doc);
        self.has_documents = true;
    }

    /// Monotonic add: `has_child_folders` is set on first add and never reset.
    pub fn add_child_folder(&mut self, folder: FolderNode) {
        self.child_folders.push(folder);
        self.has_child_folders = true;
    }
}

/// Immutable document value, created once per remote item observed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub web_url: String,
    pub e_tag: String,
    /// Change token: changes whenever content or metadata changes.
    pub c_tag: String,
    pub created_by: String,
    pub created_date_time: Option<DateTime<FixedOffset>>,
    pub last_modified_by: String,
    pub last_modified_date_time: Option<DateTime<FixedOffset>>,
    pub size: u64,
    /// File extension without the dot, e.g. "docx". Empty when absent.
    pub extension: String,
    /// Ephemeral, time-limited content URL; empty when the provider did not
    /// attach one. Never a long-term identity — that is the composite key
    /// (drive id, folder id, document id).
    pub download_url: String,
    pub parent_drive_id: String,
    pub parent_folder_id: String,
    pub parent_site_id: String,
}

impl Document {
    pub fn from_item(item: &DriveItem) -> Self {
        let name = item.name.clone().unwrap_or_default();
        let extension = if item.file.is_some() {
            extension_of(&name)
        } else {
            String::new()
        };
        // The legacy @content spelling wins when both side-channel fields
        // are present.
        let download_url = item
            .content_download_url
            .clone()
            .or_else(|| item.download_url.clone())
            .unwrap_or_default();
        let parent = item.parent_reference.as_ref();
        Self {
            id: item.id.clone().unwrap_or_default(),
            name,
            web_url: item.web_url.clone().unwrap_or_default(),
            e_tag: item.e_tag.clone().unwrap_or_default(),
            c_tag: item.c_tag.clone().unwrap_or_default(),
            created_by: item
                .created_by
                .as_ref()
                .map(|i| i.display_name())
                .unwrap_or_default(),
            created_date_time: item.created_date_time,
            last_modified_by: item
                .last_modified_by
                .as_ref()
                .map(|i| i.display_name())
                .unwrap_or_default(),
            last_modified_date_time: item.last_modified_date_time,
            size: item.size.unwrap_or(0),
            extension,
            download_url,
            parent_drive_id: parent
                .and_then(|r| r.drive_id.clone())
                .unwrap_or_default(),
            parent_folder_id: parent.and_then(|r| r.id.clone()).unwrap_or_default(),
            parent_site_id: parent.and_then(|r| r.site_id.clone()).unwrap_or_default(),
        }
    }
}

fn parent_reference_of(drive_id: Option<&str>, name: Option<&str>) -> String {
    format!(
        "id:{},name:{}",
        drive_id.unwrap_or_default(),
        name.unwrap_or_default()
    )
}

/// Extension of `name` without the dot, scanning back from the end and
/// stopping at path separators. A trailing dot yields the empty string.
pub(crate) fn extension_of(name: &str) -> String {
    for (i, ch) in name.char_indices().rev() {
        match ch {
            '.' => {
                if i + 1 < name.len() {
                    return name[i + 1..].to_string();
                }
                return String::new();
            }
            '/' | '\\' | ':' => break,
            _ => {}
        }
    }
    String::new()
}
