//! Marketplace listings.
//!
//! A [`CatalogEntry`] is what the catalog returns from a search: an
//! installable script plus display-only fields (rating, downloads, category).

use serde::{Deserialize, Serialize};

use crate::id::ScriptId;
use crate::script::{ScriptDescriptor, DEFAULT_ENTRY_POINT};
use crate::search::matches_any;

/// Category value that matches every entry.
pub const ALL_CATEGORIES: &str = "all";

/// A publishable script as listed by a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: ScriptId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: f32,
    /// Human-readable download count, e.g. `"50K+"`.
    #[serde(default)]
    pub downloads: String,
    /// Whether the script works without network access.
    #[serde(default)]
    pub offline: bool,
    pub code: String,
    #[serde(default, alias = "main", skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl CatalogEntry {
    /// Query matches name or description; category `""`/`"all"` matches any.
    pub fn matches(&self, query: &str, category: &str) -> bool {
        let category = category.trim();
        let in_category = category.is_empty()
            || category.eq_ignore_ascii_case(ALL_CATEGORIES)
            || self.category.eq_ignore_ascii_case(category);
        in_category && matches_any(query, [self.name.as_str(), self.description.as_str()])
    }

    /// Converts the listing to its installable shape.
    pub fn to_descriptor(&self) -> ScriptDescriptor {
        ScriptDescriptor {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            author: Some(self.author.clone()),
            version: Some(self.version.clone()),
            code: Some(self.code.clone()),
            entry_point: Some(
                self.entry_point
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string()),
            ),
            packages: Some(self.packages.clone()),
        }
    }
}
