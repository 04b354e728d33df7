//! Storage error types for hybrid-storage.
//!
//! Absence of a record is not an error (see [`crate::ScriptStore::load`]);
//! everything here is an underlying storage-engine failure.

use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite engine reported a failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// JSON serialization or deserialization of a stored column failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be turned back into a record.
    #[error("corrupt record '{id}': {reason}")]
    Corrupt { id: String, reason: String },
}
