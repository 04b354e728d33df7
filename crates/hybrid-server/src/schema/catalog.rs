//! Catalog request/response types.

use serde::{Deserialize, Serialize};

use hybrid_core::catalog::ALL_CATEGORIES;
use hybrid_core::CatalogEntry;

/// Number of entries `GET /catalog/popular` returns without `limit`.
pub const DEFAULT_POPULAR_LIMIT: usize = 10;

/// Query for `GET /catalog`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "all_categories")]
    pub category: String,
}

fn all_categories() -> String {
    ALL_CATEGORIES.to_string()
}

/// Query for `GET /catalog/popular`.
#[derive(Debug, Clone, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_POPULAR_LIMIT
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogListResponse {
    pub scripts: Vec<CatalogEntry>,
}
