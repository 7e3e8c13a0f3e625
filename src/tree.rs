//! Recursive folder-tree mapping.
//!
//! The mapper reconstructs a logical folder hierarchy from the flat children
//! listings, depth-first: a child folder's subtree is fully resolved before
//! the child is attached to its parent. Recursion is bounded by a configured
//! depth; levels past the bound are silently truncated.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::graph::GraphApi;
use crate::model::{Document, FolderNode};

pub struct TreeMapper {
    api: Arc<dyn GraphApi>,
    max_depth: u32,
}

/// Result of a mapping: the tree with everything reachable, plus the
/// subtrees whose children listing failed. A failed subtree is pruned, not
/// fatal, so callers decide what a partial tree is worth.
#[derive(Debug)]
pub struct FolderMap {
    pub root: FolderNode,
    pub failures: Vec<SubtreeFailure>,
}

impl FolderMap {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct SubtreeFailure {
    pub folder_id: String,
    pub folder_name: String,
    pub error: Error,
}

impl TreeMapper {
    pub fn new(api: Arc<dyn GraphApi>, max_depth: u32) -> Self {
        Self { api, max_depth }
    }

    /// Map the folder tree rooted at `start_folder_id`.
    ///
    /// Failure to fetch the start item itself is fatal; failures below it
    /// are collected per subtree.
    pub async fn map_folder(
        &self,
        drive_id: &str,
        start_folder_id: &str,
    ) -> Result<FolderMap, Error> {
        let item = self.api.get_item(drive_id, start_folder_id).await?;
        let mut root = FolderNode::from_item(&item);
        let mut failures = Vec::new();
        let root_id = item.id.clone().unwrap_or_default();
        self.expand(&mut root, drive_id, root_id, 1, &mut failures)
            .await;
        debug!(
            folders = root.child_folders.len(),
            documents = root.documents.len(),
            failures = failures.len(),
            "folder tree mapped"
        );
        Ok(FolderMap { root, failures })
    }

    /// `depth` counts the level of the children being listed; root children
    /// are level 1. Listing stops once the level exceeds the bound.
    fn expand<'a>(
        &'a self,
        node: &'a mut FolderNode,
        drive_id: &'a str,
        folder_id: String,
        depth: u32,
        failures: &'a mut Vec<SubtreeFailure>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if depth > self.max_depth {
                return;
            }
            // One page of children; deeper pagination is not performed at
            // this level.
            let page = match self.api.get_children(drive_id, &folder_id).await {
                Ok(page) => page,
                Err(error) => {
                    warn!(%error, folder = node.name, "subtree listing failed, pruned");
                    failures.push(SubtreeFailure {
                        folder_id,
                        folder_name: node.name.clone(),
                        error,
                    });
                    return;
                }
            };
            for child in &page.value {
                if child.file.is_some() {
                    node.add_document(Document::from_item(child));
                } else if child.folder.is_some() {
                    let mut subfolder = FolderNode::from_item(child);
                    let child_id = child.id.clone().unwrap_or_default();
                    self.expand(&mut subfolder, drive_id, child_id, depth + 1, failures)
                        .await;
                    node.add_child_folder(subfolder);
                }
                // An item carrying neither facet is not attached.
            }
        })
    }
}
