//! Static catalog that works without network access.

use async_trait::async_trait;

use hybrid_core::{CatalogEntry, ScriptDescriptor, ScriptId};

use super::{Catalog, CatalogError};

const INVOICE_READER: &str = r#"
def main(input):
    return {
        'invoice_number': 'INV-2024-001',
        'amount': '$1,234.56',
        'date': '2024-01-15',
        'vendor': 'ACME Corp'
    }
"#;

const RECEIPT_SPLITTER: &str = r#"
def main(input):
    return {
        'items': [
            {'name': 'Item 1', 'price': 10.99},
            {'name': 'Item 2', 'price': 24.99}
        ],
        'total': 35.98,
        'tax': 2.80
    }
"#;

const HELLO_WORLD: &str = r#"
def main(input):
    name = input.get('name', 'World')
    return {'message': f'Hello {name}!'}
"#;

/// A fixed, in-memory list of catalog entries.
#[derive(Debug, Clone)]
pub struct OfflineCatalog {
    entries: Vec<CatalogEntry>,
}

impl OfflineCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        OfflineCatalog { entries }
    }

    /// The scripts bundled with the engine.
    pub fn builtin() -> Self {
        let table = [
            (
                "invoice-reader",
                "Invoice Reader",
                "Extract data from invoice images",
                "finance",
                4.8,
                "50K+",
                INVOICE_READER,
            ),
            (
                "receipt-splitter",
                "Receipt Splitter",
                "Split receipt items into categories",
                "finance",
                4.6,
                "32K+",
                RECEIPT_SPLITTER,
            ),
            (
                "hello-world",
                "Hello World",
                "Simple test script",
                "examples",
                5.0,
                "10K+",
                HELLO_WORLD,
            ),
        ];

        let entries = table
            .into_iter()
            .filter_map(
                |(id, name, description, category, rating, downloads, code)| {
                    Some(CatalogEntry {
                        id: ScriptId::new(id).ok()?,
                        name: name.to_string(),
                        description: description.to_string(),
                        author: "Hybrid Labs".to_string(),
                        version: "1.0.0".to_string(),
                        category: category.to_string(),
                        rating,
                        downloads: downloads.to_string(),
                        offline: true,
                        code: code.to_string(),
                        entry_point: None,
                        packages: Vec::new(),
                    })
                },
            )
            .collect();
        OfflineCatalog::new(entries)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl Default for OfflineCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl Catalog for OfflineCatalog {
    async fn search(&self, query: &str, category: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.matches(query, category))
            .cloned()
            .collect())
    }

    async fn download(&self, id: &ScriptId) -> Result<ScriptDescriptor, CatalogError> {
        self.entries
            .iter()
            .find(|e| &e.id == id)
            .map(CatalogEntry::to_descriptor)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_query_returns_everything() {
        let catalog = OfflineCatalog::builtin();
        assert_eq!(catalog.search("", "all").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_filters_by_query_and_category() {
        let catalog = OfflineCatalog::builtin();
        let hits = catalog.search("receipt", "all").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "receipt-splitter");

        assert_eq!(catalog.search("", "finance").await.unwrap().len(), 2);
        assert!(catalog.search("no-such-script", "all").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_resolves_installable_shape() {
        let catalog = OfflineCatalog::builtin();
        let d = catalog
            .download(&ScriptId::new("hello-world").unwrap())
            .await
            .unwrap();
        assert_eq!(d.entry_point.as_deref(), Some("main"));
        assert_eq!(d.packages, Some(Vec::new()));
        assert!(d.code.unwrap().contains("Hello {name}"));

        let missing = catalog.download(&ScriptId::new("nope").unwrap()).await;
        assert!(matches!(missing, Err(CatalogError::NotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn popular_truncates() {
        let catalog = OfflineCatalog::builtin();
        assert_eq!(catalog.popular(2).await.unwrap().len(), 2);
        assert_eq!(catalog.popular(10).await.unwrap().len(), 3);
        assert!(catalog.popular(0).await.unwrap().is_empty());
    }
}
