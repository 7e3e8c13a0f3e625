//! High-level document-management facade.
//!
//! A client is bound to one site and its base document folder. It resolves
//! the site id once and reuses it; the drive and folder below it are
//! resolved per call so permission or structure changes surface promptly.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::config::SharePointConfig;
use crate::deep_link;
use crate::drives::DriveResolver;
use crate::error::Error;
use crate::graph::http::{GraphHttpClient, StaticTokenSource};
use crate::graph::GraphApi;
use crate::model::{Document, DriveRef, FolderNode, SiteRef};
use crate::sites::SiteResolver;
use crate::transfer::{ProgressFn, TransferEngine};
use crate::tree::{FolderMap, TreeMapper};

pub struct SharePointDmsClient {
    api: Arc<dyn GraphApi>,
    config: SharePointConfig,
    site_name: String,
    sites: SiteResolver,
    drives: DriveResolver,
    mapper: TreeMapper,
    transfers: TransferEngine,
    site_id: Mutex<Option<String>>,
}

impl SharePointDmsClient {
    pub fn new(api: Arc<dyn GraphApi>, config: SharePointConfig, site_name: &str) -> Self {
        Self {
            sites: SiteResolver::new(api.clone(), config.clone()),
            drives: DriveResolver::new(api.clone(), config.clone()),
            mapper: TreeMapper::new(api.clone(), config.max_depth),
            transfers: TransferEngine::new(api.clone(), config.small_file_threshold),
            api,
            config,
            site_name: site_name.to_string(),
            site_id: Mutex::new(None),
        }
    }

    /// Client backed by the real HTTP provider with a fixed bearer token.
    pub fn from_token(token: &str, config: SharePointConfig, site_name: &str) -> Self {
        let tokens = Arc::new(StaticTokenSource::new(token));
        Self::new(Arc::new(GraphHttpClient::new(tokens)), config, site_name)
    }

    /// The bound site's id, resolved on first use and memoized for the
    /// client's lifetime.
    pub async fn site_id(&self) -> Result<String, Error> {
        if let Some(id) = self.site_id.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            return Ok(id);
        }
        let site = self.sites.resolve_by_name(&self.site_name).await?;
        let mut cached = self.site_id.lock().unwrap_or_else(|e| e.into_inner());
        *cached = Some(site.id.clone());
        Ok(site.id)
    }

    pub async fn default_drive(&self) -> Result<DriveRef, Error> {
        let site_id = self.site_id().await?;
        self.drives.default_drive(&site_id).await
    }

    /// Id of the base document folder under the default drive root.
    pub async fn base_folder_id(&self) -> Result<(String, String), Error> {
        let site_id = self.site_id().await?;
        let drive_id = self.drives.default_drive_id(&site_id).await?;
        let folder_id = self
            .drives
            .folder_id_by_name(&site_id, &drive_id, &self.config.base_folder)
            .await?;
        Ok((drive_id, folder_id))
    }

    /// Upload a document into the base folder and return its deep link.
    pub async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        progress: Option<ProgressFn>,
    ) -> Result<String, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        let mut doc = self
            .transfers
            .upload(&drive_id, &folder_id, file_name, bytes, progress)
            .await?;
        if doc.parent_site_id.is_empty() {
            doc.parent_site_id = self.site_id().await?;
        }
        let url = deep_link::encode_doc_url(&doc)?;
        info!(file_name, "document uploaded and linked");
        Ok(url)
    }

    /// Map the folder tree below the base folder.
    pub async fn map_folder_tree(&self) -> Result<FolderMap, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        self.mapper.map_folder(&drive_id, &folder_id).await
    }

    /// Map the folder tree below an arbitrary folder of the default drive.
    pub async fn map_folder(&self, folder_id: &str) -> Result<FolderMap, Error> {
        let site_id = self.site_id().await?;
        let drive_id = self.drives.default_drive_id(&site_id).await?;
        self.mapper.map_folder(&drive_id, folder_id).await
    }

    /// Fetch a document's content through its deep link.
    pub async fn download_by_url(&self, url: &str) -> Result<Option<Vec<u8>>, Error> {
        let doc = deep_link::parse_doc_url(url)?;
        if doc.parent_drive_id.is_empty() || doc.id.is_empty() {
            return Err(Error::InvalidArgument(
                "deep link is missing driveid or docid".to_string(),
            ));
        }
        debug!(doc_id = doc.id, "download by deep link");
        self.transfers
            .download(&doc.parent_drive_id, &doc.parent_folder_id, &doc.id)
            .await
    }

    /// Delete a document through its deep link.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), Error> {
        let doc = deep_link::parse_doc_url(url)?;
        if doc.parent_drive_id.is_empty() || doc.id.is_empty() {
            return Err(Error::InvalidArgument(
                "deep link is missing driveid or docid".to_string(),
            ));
        }
        self.transfers.delete(&doc.parent_drive_id, &doc.id).await
    }

    /// Short-lived direct download URL for a named document in the base
    /// folder. Empty when the document is absent.
    pub async fn download_url(&self, file_name: &str) -> Result<String, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        let doc = match self
            .drives
            .document_by_name(&drive_id, &folder_id, file_name)
            .await
        {
            Ok(doc) => doc,
            Err(Error::NotFound(_)) => return Ok(String::new()),
            Err(err) => return Err(err),
        };
        self.transfers
            .download_url(&drive_id, &folder_id, &doc.id)
            .await
    }

    /// Named document among the base folder's immediate children.
    pub async fn document_by_name(&self, file_name: &str) -> Result<Document, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        self.drives
            .document_by_name(&drive_id, &folder_id, file_name)
            .await
    }

    /// Every document directly under the base folder.
    pub async fn base_folder_documents(&self) -> Result<Vec<Document>, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        self.drives.folder_documents(&drive_id, &folder_id).await
    }

    /// Create a subfolder under the base folder, renaming on collision.
    pub async fn create_subfolder(&self, name: &str) -> Result<FolderNode, Error> {
        let (drive_id, folder_id) = self.base_folder_id().await?;
        self.drives
            .create_subfolder(&drive_id, &folder_id, name)
            .await
    }

    /// Content-based document lookup on the default drive.
    pub async fn find_document_by_ctag(&self, ctag: &str) -> Result<Option<Document>, Error> {
        let site_id = self.site_id().await?;
        let drive_id = self.drives.default_drive_id(&site_id).await?;
        self.drives.find_document_by_ctag(&drive_id, ctag).await
    }

    /// Resolve a sub-site of the bound site by display name.
    pub async fn sub_site(&self, sub_name: &str) -> Result<SiteRef, Error> {
        let site_id = self.site_id().await?;
        self.sites.resolve_sub_by_name(&site_id, sub_name).await
    }

    /// All top-level sites visible to the caller.
    pub async fn all_sites(&self) -> Result<Vec<SiteRef>, Error> {
        self.sites.list_all().await
    }

    /// Deep link for a document value.
    pub fn url_from_doc(&self, doc: &Document) -> Result<String, Error> {
        deep_link::encode_doc_url(doc)
    }

    /// Partial document decoded from a deep link, without touching the
    /// remote service.
    pub fn doc_from_url(&self, url: &str) -> Result<Document, Error> {
        deep_link::parse_doc_url(url)
    }

    pub fn api(&self) -> &Arc<dyn GraphApi> {
        &self.api
    }

    pub fn config(&self) -> &SharePointConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::mock::MockGraph;
    use crate::graph::wire::{Drive, DriveItem, FileFacet, FolderFacet, Site};

    fn seeded_mock() -> MockGraph {
        let site = Site {
            id: Some("s1".to_string()),
            name: Some("Finance".to_string()),
            drives: Some(vec![Drive {
                id: Some("d1".to_string()),
                web_url: Some(
                    "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents"
                        .to_string(),
                ),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let mock = MockGraph::new()
            .with_site("contoso.sharepoint.com:/sites/Finance/", site.clone())
            .with_site("s1", site);
        mock.state.lock().unwrap().drive_roots.insert(
            "d1".to_string(),
            DriveItem {
                id: Some("root".to_string()),
                children: Some(vec![DriveItem {
                    id: Some("dms".to_string()),
                    name: Some("DMS".to_string()),
                    folder: Some(FolderFacet::default()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        );
        mock
    }

    fn client(mock: Arc<MockGraph>) -> SharePointDmsClient {
        SharePointDmsClient::new(
            mock,
            SharePointConfig::new("contoso.sharepoint.com", "DMS"),
            "Finance",
        )
    }

    #[tokio::test]
    async fn test_site_id_resolved_once() {
        let mock = Arc::new(seeded_mock());
        let client = client(mock.clone());
        assert_eq!(client.site_id().await.unwrap(), "s1");
        assert_eq!(client.site_id().await.unwrap(), "s1");
        // one path lookup, not one per call
        assert_eq!(mock.calls().get_site, 1);
    }

    #[tokio::test]
    async fn test_upload_document_returns_deep_link() {
        let mock = Arc::new(seeded_mock());
        mock.state.lock().unwrap().upload_result = Some(DriveItem {
            id: Some("doc1".to_string()),
            name: Some("report.docx".to_string()),
            web_url: Some(
                "https://contoso.sharepoint.com/sites/Finance/report.docx".to_string(),
            ),
            file: Some(FileFacet::default()),
            ..Default::default()
        });
        let url = client(mock)
            .upload_document("report.docx", b"hello".to_vec(), None)
            .await
            .unwrap();
        assert!(url.contains("docid=doc1"));
        assert!(url.contains("parentsiteid=s1"));
    }

    #[tokio::test]
    async fn test_download_by_url_requires_composite_key() {
        let client = client(Arc::new(seeded_mock()));
        let result = client
            .download_by_url("https://contoso.sharepoint.com/sites/Finance/doc?docid=doc1")
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_download_by_url() {
        let mock = Arc::new(seeded_mock());
        mock.state
            .lock()
            .unwrap()
            .content
            .insert(("d1".to_string(), "doc1".to_string()), b"body".to_vec());
        let bytes = client(mock)
            .download_by_url(
                "https://contoso.sharepoint.com/sites/Finance/doc?driveid=d1&docid=doc1",
            )
            .await
            .unwrap();
        assert_eq!(bytes.as_deref(), Some(b"body".as_ref()));
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let mock = Arc::new(seeded_mock());
        client(mock.clone())
            .delete_by_url(
                "https://contoso.sharepoint.com/sites/Finance/doc?driveid=d1&docid=doc1",
            )
            .await
            .unwrap();
        assert_eq!(
            mock.state.lock().unwrap().deleted,
            vec![("d1".to_string(), "doc1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_download_url_resolves_name_to_id() {
        let mock = seeded_mock().with_children(
            "d1",
            "dms",
            vec![DriveItem {
                id: Some("doc1".to_string()),
                name: Some("report.docx".to_string()),
                file: Some(FileFacet::default()),
                download_url: Some("https://dl.example/doc1".to_string()),
                ..Default::default()
            }],
        );
        let client = client(Arc::new(mock));
        let url = client.download_url("report.docx").await.unwrap();
        assert_eq!(url, "https://dl.example/doc1");
        let absent = client.download_url("missing.docx").await.unwrap();
        assert_eq!(absent, "");
    }

    #[tokio::test]
    async fn test_deep_link_round_trip_through_facade() {
        let client = client(Arc::new(seeded_mock()));
        let doc = Document {
            id: "doc1".to_string(),
            web_url: "https://contoso.sharepoint.com/sites/Finance/report.docx".to_string(),
            parent_drive_id: "d1".to_string(),
            parent_folder_id: "dms".to_string(),
            parent_site_id: "s1".to_string(),
            ..Default::default()
        };
        let url = client.url_from_doc(&doc).unwrap();
        let decoded = client.doc_from_url(&url).unwrap();
        assert_eq!(decoded.id, "doc1");
        assert_eq!(decoded.parent_drive_id, "d1");
        assert_eq!(decoded.parent_folder_id, "dms");
        assert_eq!(decoded.parent_site_id, "s1");
    }

    #[tokio::test]
    async fn test_map_folder_tree_starts_at_base_folder() {
        let mock = seeded_mock()
            .with_item(
                "d1",
                DriveItem {
                    id: Some("dms".to_string()),
                    name: Some("DMS".to_string()),
                    folder: Some(FolderFacet::default()),
                    ..Default::default()
                },
            )
            .with_children(
                "d1",
                "dms",
                vec![DriveItem {
                    id: Some("doc1".to_string()),
                    name: Some("a.txt".to_string()),
                    file: Some(FileFacet::default()),
                    ..Default::default()
                }],
            );
        let mock = Arc::new(mock);
        let map = client(mock).map_folder_tree().await.unwrap();
        assert_eq!(map.root.name, "DMS");
        assert_eq!(map.root.documents.len(), 1);
    }
}
