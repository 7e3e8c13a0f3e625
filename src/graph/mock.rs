//! In-memory `GraphApi` double for unit tests.
//!
//! Holds canned responses keyed the way the verbs address them and counts
//! every provider call so tests can assert on wire traffic.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::wire::{DriveItem, ItemPage, Site, SitePage, UploadSession};
use super::GraphApi;
use crate::error::Error;

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub get_site: u32,
    pub search_sites: u32,
    pub list_subsites: u32,
    pub list_sites: u32,
    pub get_drive_root: u32,
    pub get_item: u32,
    pub get_children: u32,
    pub put_content: u32,
    pub create_upload_session: u32,
    pub put_slice: u32,
    pub get_content: u32,
    pub delete_item: u32,
    pub create_folder: u32,
    pub find_by_ctag: u32,
}

#[derive(Default)]
pub struct State {
    pub sites: HashMap<String, Site>,
    pub failing_sites: HashSet<String>,
    pub search_results: HashMap<String, Vec<Site>>,
    pub search_fails: bool,
    pub subsite_pages: Vec<Vec<Site>>,
    pub site_pages: Vec<Vec<Site>>,
    pub drive_roots: HashMap<String, DriveItem>,
    pub items: HashMap<(String, String), DriveItem>,
    pub children: HashMap<(String, String), Vec<DriveItem>>,
    pub failing_children: HashSet<(String, String)>,
    pub content: HashMap<(String, String), Vec<u8>>,
    pub upload_result: Option<DriveItem>,
    pub ctag_results: HashMap<String, Vec<DriveItem>>,
    pub slices: Vec<(u64, usize)>,
    pub deleted: Vec<(String, String)>,
    pub calls: Calls,
}

#[derive(Default)]
pub struct MockGraph {
    pub state: Mutex<State>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn with_site(self, key: &str, site: Site) -> Self {
        self.state
            .lock()
            .unwrap()
            .sites
            .insert(key.to_string(), site);
        self
    }

    pub fn with_children(self, drive_id: &str, item_id: &str, children: Vec<DriveItem>) -> Self {
        self.state
            .lock()
            .unwrap()
            .children
            .insert((drive_id.to_string(), item_id.to_string()), children);
        self
    }

    pub fn with_item(self, drive_id: &str, item: DriveItem) -> Self {
        let id = item.id.clone().unwrap_or_default();
        self.state
            .lock()
            .unwrap()
            .items
            .insert((drive_id.to_string(), id), item);
        self
    }

    pub fn with_upload_result(self, item: DriveItem) -> Self {
        self.state.lock().unwrap().upload_result = Some(item);
        self
    }

    fn page_link(pages: &[Vec<Site>], index: usize) -> Option<String> {
        if index + 1 < pages.len() {
            Some(format!("page:{}", index + 1))
        } else {
            None
        }
    }

    fn page_index(page_link: Option<&str>) -> usize {
        page_link
            .and_then(|l| l.strip_prefix("page:"))
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

#[async_trait]
impl GraphApi for MockGraph {
    async fn search_sites(
        &self,
        _parent_site_id: &str,
        query: &str,
    ) -> Result<Vec<Site>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.search_sites += 1;
        if state.search_fails {
            return Err(Error::Transport("search unavailable".to_string()));
        }
        Ok(state.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn get_site(
        &self,
        site_id_or_path: &str,
        _expand_drives: bool,
    ) -> Result<Site, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_site += 1;
        if state.failing_sites.contains(site_id_or_path) {
            return Err(Error::Transport("503 service unavailable".to_string()));
        }
        state
            .sites
            .get(site_id_or_path)
            .cloned()
            .ok_or_else(|| Error::NotFound(site_id_or_path.to_string()))
    }

    async fn list_subsites(
        &self,
        _parent_site_id: &str,
        _page_size: u32,
        page_link: Option<&str>,
    ) -> Result<SitePage, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_subsites += 1;
        let index = Self::page_index(page_link);
        let value = state.subsite_pages.get(index).cloned().unwrap_or_default();
        let next_link = Self::page_link(&state.subsite_pages, index);
        Ok(SitePage { value, next_link })
    }

    async fn list_sites(
        &self,
        _page_size: u32,
        page_link: Option<&str>,
    ) -> Result<SitePage, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_sites += 1;
        let index = Self::page_index(page_link);
        let value = state.site_pages.get(index).cloned().unwrap_or_default();
        let next_link = Self::page_link(&state.site_pages, index);
        Ok(SitePage { value, next_link })
    }

    async fn get_drive_root(&self, drive_id: &str) -> Result<DriveItem, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_drive_root += 1;
        state
            .drive_roots
            .get(drive_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(drive_id.to_string()))
    }

    async fn get_item(&self, drive_id: &str, item_id: &str) -> Result<DriveItem, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_item += 1;
        state
            .items
            .get(&(drive_id.to_string(), item_id.to_string()))
            .cloned()
            .ok_or_else(|| Error::NotFound(item_id.to_string()))
    }

    async fn get_children(&self, drive_id: &str, item_id: &str) -> Result<ItemPage, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_children += 1;
        let key = (drive_id.to_string(), item_id.to_string());
        if state.failing_children.contains(&key) {
            return Err(Error::Transport("children fetch failed".to_string()));
        }
        Ok(ItemPage {
            value: state.children.get(&key).cloned().unwrap_or_default(),
            next_link: None,
        })
    }

    async fn put_content(
        &self,
        _drive_id: &str,
        _folder_id: &str,
        _path: &str,
        _bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.put_content += 1;
        Ok(state.upload_result.clone())
    }

    async fn create_upload_session(
        &self,
        _drive_id: &str,
        _folder_id: &str,
        _path: &str,
    ) -> Result<UploadSession, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_upload_session += 1;
        Ok(UploadSession {
            upload_url: "https://upload.example/session".to_string(),
            ..Default::default()
        })
    }

    async fn put_slice(
        &self,
        _session: &UploadSession,
        offset: u64,
        total: u64,
        bytes: Vec<u8>,
    ) -> Result<Option<DriveItem>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.put_slice += 1;
        state.slices.push((offset, bytes.len()));
        if offset + bytes.len() as u64 == total {
            Ok(state.upload_result.clone())
        } else {
            Ok(None)
        }
    }

    async fn get_content(
        &self,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Option<Vec<u8>>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.get_content += 1;
        Ok(state
            .content
            .get(&(drive_id.to_string(), item_id.to_string()))
            .cloned())
    }

    async fn delete_item(&self, drive_id: &str, item_id: &str) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.delete_item += 1;
        state
            .deleted
            .push((drive_id.to_string(), item_id.to_string()));
        Ok(())
    }

    async fn create_folder(
        &self,
        drive_id: &str,
        parent_item_id: &str,
        name: &str,
    ) -> Result<DriveItem, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_folder += 1;
        Ok(DriveItem {
            id: Some(format!("{drive_id}-{parent_item_id}-{name}")),
            name: Some(name.to_string()),
            folder: Some(Default::default()),
            ..Default::default()
        })
    }

    async fn find_by_ctag(&self, _drive_id: &str, ctag: &str) -> Result<Vec<DriveItem>, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.find_by_ctag += 1;
        Ok(state.ctag_results.get(ctag).cloned().unwrap_or_default())
    }
}
