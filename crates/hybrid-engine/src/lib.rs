//! Execution coordinator for installed scripts.
//!
//! [`Engine`] is the single coordinator between hosts (HTTP server, CLI) and
//! the store, the runtime, and the catalog. It persists installed scripts,
//! provisions their packages best-effort, funnels every run through one
//! runtime instance, and normalizes results into a stable contract.
//!
//! # Modules
//!
//! - [`engine`]: the [`Engine`] and its initialization state machine
//! - [`outcome`]: [`ScriptOutcome`], the tagged view of a run result
//! - [`runtime`]: the runtime capability plus the Python process and stub
//!   implementations
//! - [`catalog`]: the catalog capability plus offline and HTTP clients
//! - [`config`]: environment-driven configuration
//! - [`error`]: [`EngineError`]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod runtime;

pub use catalog::{Catalog, CatalogError, CatalogFallback, HttpCatalog, OfflineCatalog};
pub use config::{CatalogMode, EngineConfig};
pub use engine::{Engine, EngineState, InstallReceipt, INPUT_GLOBAL};
pub use hybrid_storage::ProvisionedPackage;
pub use error::EngineError;
pub use outcome::ScriptOutcome;
pub use runtime::{RuntimeConfig, RuntimeError, RuntimeLoader, ScriptRuntime};
