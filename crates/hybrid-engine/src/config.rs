//! Environment-driven configuration.
//!
//! Read by [`EngineConfig::from_env`]:
//! - `HYBRID_DB_PATH`: SQLite database file path (default: "hybrid.db")
//! - `HYBRID_PYTHON`: interpreter executable (default: "python3")
//! - `HYBRID_FULL_STDLIB`: preload the standard library (default: false)
//! - `HYBRID_PACKAGES`: comma-separated packages provisioned at init
//! - `HYBRID_CATALOG_URL`: marketplace base URL
//! - `HYBRID_CATALOG_OFFLINE`: use only the built-in catalog (default: false)
//! - `HYBRID_CATALOG_STRICT`: fail instead of falling back offline
//!   (default: false)

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogFallback, HttpCatalog, OfflineCatalog, DEFAULT_CATALOG_URL};
use crate::runtime::RuntimeConfig;

/// Which catalog the engine consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogMode {
    /// Built-in entries only; no network.
    Offline,
    /// Marketplace at `url`, with the given fallback policy.
    Network {
        url: String,
        fallback: CatalogFallback,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: String,
    pub runtime: RuntimeConfig,
    pub catalog: CatalogMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            db_path: "hybrid.db".to_string(),
            runtime: RuntimeConfig::default(),
            catalog: CatalogMode::Network {
                url: DEFAULT_CATALOG_URL.to_string(),
                fallback: CatalogFallback::Offline,
            },
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();

        let runtime = RuntimeConfig {
            source_url: lookup("HYBRID_PYTHON").unwrap_or(defaults.runtime.source_url),
            load_standard_library: flag(lookup("HYBRID_FULL_STDLIB")),
            preinstalled_packages: lookup("HYBRID_PACKAGES")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let catalog = if flag(lookup("HYBRID_CATALOG_OFFLINE")) {
            CatalogMode::Offline
        } else {
            CatalogMode::Network {
                url: lookup("HYBRID_CATALOG_URL").unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
                fallback: if flag(lookup("HYBRID_CATALOG_STRICT")) {
                    CatalogFallback::Fail
                } else {
                    CatalogFallback::Offline
                },
            }
        };

        EngineConfig {
            db_path: lookup("HYBRID_DB_PATH").unwrap_or(defaults.db_path),
            runtime,
            catalog,
        }
    }

    pub fn build_catalog(&self) -> Arc<dyn Catalog> {
        match &self.catalog {
            CatalogMode::Offline => Arc::new(OfflineCatalog::builtin()),
            CatalogMode::Network { url, fallback } => Arc::new(HttpCatalog::new(url, *fallback)),
        }
    }
}

fn flag(value: Option<String>) -> bool {
    matches!(
        value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        assert_eq!(config(&[]), EngineConfig::default());
    }

    #[test]
    fn reads_runtime_settings() {
        let cfg = config(&[
            ("HYBRID_PYTHON", "/usr/bin/python3.12"),
            ("HYBRID_FULL_STDLIB", "TRUE"),
            ("HYBRID_PACKAGES", "numpy, ,pandas"),
            ("HYBRID_DB_PATH", "/tmp/x.db"),
        ]);
        assert_eq!(cfg.runtime.source_url, "/usr/bin/python3.12");
        assert!(cfg.runtime.load_standard_library);
        assert_eq!(cfg.runtime.preinstalled_packages, vec!["numpy", "pandas"]);
        assert_eq!(cfg.db_path, "/tmp/x.db");
    }

    #[test]
    fn catalog_modes() {
        assert_eq!(
            config(&[("HYBRID_CATALOG_OFFLINE", "1")]).catalog,
            CatalogMode::Offline
        );
        assert_eq!(
            config(&[
                ("HYBRID_CATALOG_URL", "http://localhost:9000"),
                ("HYBRID_CATALOG_STRICT", "yes"),
            ])
            .catalog,
            CatalogMode::Network {
                url: "http://localhost:9000".into(),
                fallback: CatalogFallback::Fail,
            }
        );
    }
}
