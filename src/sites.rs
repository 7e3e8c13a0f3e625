//! Site resolution: display names to sites, including sub-sites.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SharePointConfig;
use crate::error::Error;
use crate::graph::GraphApi;
use crate::model::SiteRef;

pub struct SiteResolver {
    api: Arc<dyn GraphApi>,
    config: SharePointConfig,
}

impl SiteResolver {
    pub fn new(api: Arc<dyn GraphApi>, config: SharePointConfig) -> Self {
        Self { api, config }
    }

    /// Resolve a top-level site by display name through its server-relative
    /// path. Absence is `NotFound`; transport faults propagate unmodified.
    pub async fn resolve_by_name(&self, site_name: &str) -> Result<SiteRef, Error> {
        let path = self.config.site_path(site_name);
        debug!(%path, "resolving site");
        let site = self.api.get_site(&path, false).await?;
        if site.id.as_deref().unwrap_or("").is_empty() {
            return Err(Error::NotFound(site_name.to_string()));
        }
        info!(site = site_name, id = site.id.as_deref().unwrap_or(""), "site resolved");
        Ok(SiteRef::from_site(&site, None))
    }

    /// Resolve a sub-site under `parent_site_id` by exact name.
    ///
    /// The server-side search is the fast first attempt; full paginated
    /// enumeration is the source of truth when search fails or finds
    /// nothing.
    pub async fn resolve_sub_by_name(
        &self,
        parent_site_id: &str,
        sub_name: &str,
    ) -> Result<SiteRef, Error> {
        match self.search_sub_site(parent_site_id, sub_name).await {
            Ok(Some(site)) => return Ok(site),
            Ok(None) => debug!(sub_name, "search found no sub-site, enumerating"),
            Err(err) => warn!(%err, sub_name, "sub-site search failed, enumerating"),
        }
        self.scan_sub_sites(parent_site_id, sub_name).await
    }

    /// All top-level sites in the tenant. `Empty` when the provider reports
    /// zero sites; transport faults propagate unmodified.
    pub async fn list_all(&self) -> Result<Vec<SiteRef>, Error> {
        let mut sites = Vec::new();
        let mut page_link: Option<String> = None;
        loop {
            let page = self
                .api
                .list_sites(self.config.subsite_page_size, page_link.as_deref())
                .await?;
            sites.extend(page.value.iter().map(|s| SiteRef::from_site(s, None)));
            match page.next_link {
                Some(link) => page_link = Some(link),
                None => break,
            }
        }
        if sites.is_empty() {
            return Err(Error::Empty("zero sites".to_string()));
        }
        Ok(sites)
    }

    async fn search_sub_site(
        &self,
        parent_site_id: &str,
        sub_name: &str,
    ) -> Result<Option<SiteRef>, Error> {
        let candidates = self.api.search_sites(parent_site_id, sub_name).await?;
        if candidates.is_empty() {
            return Ok(None);
        }
        // A unique hit is taken as-is; multiple hits are disambiguated
        // client-side on exact name, first match winning.
        let site = if candidates.len() == 1 {
            Some(&candidates[0])
        } else {
            candidates.iter().find(|s| s.effective_name() == sub_name)
        };
        Ok(site.map(|s| SiteRef::from_site(s, Some(parent_site_id))))
    }

    /// Page through every sub-site until the provider signals no further
    /// pages; no cap on total pages.
    async fn scan_sub_sites(
        &self,
        parent_site_id: &str,
        sub_name: &str,
    ) -> Result<SiteRef, Error> {
        let mut page_link: Option<String> = None;
        loop {
            let page = self
                .api
                .list_subsites(
                    parent_site_id,
                    self.config.subsite_page_size,
                    page_link.as_deref(),
                )
                .await?;
            if let Some(site) = page.value.iter().find(|s| s.effective_name() == sub_name) {
                info!(sub_name, "sub-site resolved by enumeration");
                return Ok(SiteRef::from_site(site, Some(parent_site_id)));
            }
            match page.next_link {
                Some(link) => page_link = Some(link),
                None => break,
            }
        }
        Err(Error::NotFound(sub_name.to_string()))
    }
}
