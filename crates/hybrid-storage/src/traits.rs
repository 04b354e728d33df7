//! The [`ScriptStore`] trait defining the storage contract for scripts.
//!
//! All backends (InMemoryStore, SqliteStore) implement this trait, so the
//! coordinator can swap them without changing its logic. Every call is its
//! own transaction; no multi-call transactions are exposed.

use hybrid_core::search::matches_any;
use hybrid_core::{ScriptFields, ScriptId, ScriptRecord};

use crate::error::StorageError;
use crate::types::ProvisionedPackage;

/// The storage contract for installed scripts.
///
/// The trait is synchronous. Async callers serialize access behind a lock
/// and keep each call short.
pub trait ScriptStore {
    /// Creates or fully replaces the record for `id`.
    ///
    /// Every field in `fields` overwrites the stored value. `updated_at` is
    /// stamped on every call; `installed_at` only when the record is new.
    /// Returns the key the record was stored under.
    fn save(&mut self, id: &ScriptId, fields: &ScriptFields) -> Result<ScriptId, StorageError>;

    /// Loads a record, or `None` if no script has this id.
    fn load(&self, id: &ScriptId) -> Result<Option<ScriptRecord>, StorageError>;

    /// Removes a record. Succeeds (with `true`) even if it never existed.
    fn delete(&mut self, id: &ScriptId) -> Result<bool, StorageError>;

    /// Returns every stored record, oldest install first.
    fn get_all(&self) -> Result<Vec<ScriptRecord>, StorageError>;

    /// Marks a package as provisioned now.
    fn record_package(&mut self, name: &str) -> Result<(), StorageError>;

    /// Lists packages recorded by [`ScriptStore::record_package`].
    fn list_packages(&self) -> Result<Vec<ProvisionedPackage>, StorageError>;

    /// True iff [`ScriptStore::load`] would return a record.
    ///
    /// Never fails: storage errors read as "not installed".
    fn exists(&self, id: &ScriptId) -> bool {
        match self.load(id) {
            Ok(record) => record.is_some(),
            Err(err) => {
                tracing::debug!(script = %id, error = %err, "existence check failed");
                false
            }
        }
    }

    /// Case-insensitive substring search over name, author, and description.
    ///
    /// An empty query returns every record.
    fn search(&self, query: &str) -> Result<Vec<ScriptRecord>, StorageError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| {
                matches_any(
                    query,
                    [
                        r.fields.name.as_str(),
                        r.fields.author.as_str(),
                        r.fields.description.as_str(),
                    ],
                )
            })
            .collect())
    }
}
