//! Async client for a SharePoint-backed document store.
//!
//! The crate layers filesystem-like semantics over the Microsoft Graph
//! drives API: resolve a site and its default document drive, map a bounded
//! folder tree, move document content in and out, and address individual
//! documents through self-contained deep links that embed the composite
//! `(site, drive, folder, document)` key in the document's own webUrl.
//!
//! [`SharePointDmsClient`] is the entry point; the modules below it are
//! usable on their own when only one concern is needed.

pub mod client;
pub mod config;
pub mod deep_link;
pub mod drives;
pub mod error;
pub mod graph;
pub mod model;
pub mod sites;
pub mod transfer;
pub mod tree;

pub use client::SharePointDmsClient;
pub use config::SharePointConfig;
pub use error::Error;
pub use model::{Document, DriveRef, FolderNode, SiteRef};
pub use transfer::ProgressFn;
pub use tree::{FolderMap, SubtreeFailure};
