//! Data model for the hybrid script engine.
//!
//! Defines the identity, record, and descriptor types shared by the store,
//! the execution coordinator, and the catalog client. Nothing here performs
//! I/O.
//!
//! # Modules
//!
//! - [`id`]: the [`ScriptId`] newtype
//! - [`script`]: installed [`ScriptRecord`]s, their [`ScriptFields`], and
//!   pre-installation [`ScriptDescriptor`]s
//! - [`catalog`]: marketplace-side [`CatalogEntry`] listings
//! - [`search`]: case-insensitive matching shared by store and catalog search
//! - [`error`]: [`CoreError`]

pub mod catalog;
pub mod error;
pub mod id;
pub mod script;
pub mod search;

// Re-export commonly used types
pub use catalog::CatalogEntry;
pub use error::CoreError;
pub use id::ScriptId;
pub use script::{ScriptDescriptor, ScriptFields, ScriptRecord};
pub use script::{DEFAULT_AUTHOR, DEFAULT_ENTRY_POINT, DEFAULT_VERSION};
