//! Marketplace API client.
//!
//! Endpoints, relative to the base URL:
//! - `GET /scripts?q=<query>&category=<category>` returns `[CatalogEntry]`
//! - `GET /scripts/{id}` returns one `CatalogEntry`, or 404
//!
//! Ids travel as a single percent-encoded path segment, so `a/b` is requested
//! as `/scripts/a%2Fb`. Downloaded descriptors are cached per id for the
//! lifetime of the client.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{StatusCode, Url};

use hybrid_core::{CatalogEntry, ScriptDescriptor, ScriptId};

use super::{Catalog, CatalogError, OfflineCatalog};

pub const DEFAULT_CATALOG_URL: &str = "https://api.hybrid.market/v1";

/// What to do when the marketplace cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogFallback {
    /// Report [`CatalogError::Unavailable`].
    Fail,
    /// Answer from the built-in [`OfflineCatalog`].
    #[default]
    Offline,
}

pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    fallback: CatalogFallback,
    offline: OfflineCatalog,
    cache: DashMap<ScriptId, ScriptDescriptor>,
}

impl HttpCatalog {
    pub fn new(base_url: &str, fallback: CatalogFallback) -> Self {
        HttpCatalog {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback,
            offline: OfflineCatalog::builtin(),
            cache: DashMap::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn unavailable(&self, reason: String) -> Result<(), CatalogError> {
        match self.fallback {
            CatalogFallback::Fail => Err(CatalogError::Unavailable(reason)),
            CatalogFallback::Offline => {
                tracing::warn!(reason = %reason, "catalog unreachable, using offline catalog");
                Ok(())
            }
        }
    }

    /// `{base}/scripts`, or `{base}/scripts/{id}` with the id as one segment.
    fn scripts_url(&self, id: Option<&ScriptId>) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| format!("invalid catalog URL '{}': {}", self.base_url, e))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| format!("catalog URL '{}' cannot carry a path", self.base_url))?;
            segments.pop_if_empty().push("scripts");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    async fn fetch_search(
        &self,
        query: &str,
        category: &str,
    ) -> Result<Vec<CatalogEntry>, String> {
        let url = self.scripts_url(None)?;
        let response = self
            .client
            .get(url)
            .query(&[("q", query), ("category", category)])
            .send()
            .await
            .map_err(|e| format!("search request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("search request failed ({})", status));
        }
        response
            .json::<Vec<CatalogEntry>>()
            .await
            .map_err(|e| format!("search response parse failed: {}", e))
    }

    /// `Ok(None)` means the marketplace answered 404.
    async fn fetch_entry(&self, id: &ScriptId) -> Result<Option<CatalogEntry>, String> {
        let url = self.scripts_url(Some(id))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("download request failed: {}", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(format!("download request failed ({})", status));
        }
        response
            .json::<CatalogEntry>()
            .await
            .map(Some)
            .map_err(|e| format!("download response parse failed: {}", e))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn search(&self, query: &str, category: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        match self.fetch_search(query, category).await {
            Ok(entries) => Ok(entries),
            Err(reason) => {
                self.unavailable(reason)?;
                self.offline.search(query, category).await
            }
        }
    }

    async fn download(&self, id: &ScriptId) -> Result<ScriptDescriptor, CatalogError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.clone());
        }

        match self.fetch_entry(id).await {
            Ok(Some(entry)) => {
                let descriptor = entry.to_descriptor();
                self.cache.insert(id.clone(), descriptor.clone());
                Ok(descriptor)
            }
            Ok(None) => Err(CatalogError::NotFound(id.to_string())),
            Err(reason) => {
                self.unavailable(reason)?;
                self.offline.download(id).await
            }
        }
    }
}
