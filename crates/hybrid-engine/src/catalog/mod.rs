//! The catalog capability: read-only lookup of installable scripts.
//!
//! - [`OfflineCatalog`]: a static built-in set, always available
//! - [`HttpCatalog`]: a marketplace API client with an offline fallback policy

pub mod http;
pub mod offline;

use async_trait::async_trait;

use hybrid_core::catalog::ALL_CATEGORIES;
use hybrid_core::{CatalogEntry, ScriptDescriptor, ScriptId};

pub use http::{CatalogFallback, HttpCatalog, DEFAULT_CATALOG_URL};
pub use offline::OfflineCatalog;

/// Errors from catalog lookups.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("script '{0}' not found in catalog")]
    NotFound(String),

    /// The marketplace could not be reached or answered with a failure.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Searchable source of installable scripts.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Entries whose name or description contain `query` (ignoring case),
    /// limited to `category` unless it is empty or `"all"`. An empty query
    /// returns every entry.
    async fn search(&self, query: &str, category: &str) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Resolves one entry into its installable shape.
    async fn download(&self, id: &ScriptId) -> Result<ScriptDescriptor, CatalogError>;

    /// The first `limit` entries of an unfiltered search.
    async fn popular(&self, limit: usize) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut entries = self.search("", ALL_CATEGORIES).await?;
        entries.truncate(limit);
        Ok(entries)
    }
}
