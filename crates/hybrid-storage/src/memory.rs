//! In-memory implementation of [`ScriptStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and ephemeral
//! sessions. It keeps records in HashMaps with identical semantics to the
//! SQLite backend.

use std::collections::HashMap;

use hybrid_core::{ScriptFields, ScriptId, ScriptRecord};

use crate::error::StorageError;
use crate::traits::ScriptStore;
use crate::types::{now_millis, ProvisionedPackage};

/// HashMap-backed script store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    scripts: HashMap<ScriptId, ScriptRecord>,
    packages: HashMap<String, i64>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptStore for InMemoryStore {
    fn save(&mut self, id: &ScriptId, fields: &ScriptFields) -> Result<ScriptId, StorageError> {
        let now = now_millis();
        let installed_at = self
            .scripts
            .get(id)
            .map(|existing| existing.installed_at)
            .unwrap_or(now);
        self.scripts.insert(
            id.clone(),
            ScriptRecord {
                id: id.clone(),
                fields: fields.clone(),
                installed_at,
                updated_at: now,
            },
        );
        Ok(id.clone())
    }

    fn load(&self, id: &ScriptId) -> Result<Option<ScriptRecord>, StorageError> {
        Ok(self.scripts.get(id).cloned())
    }

    fn delete(&mut self, id: &ScriptId) -> Result<bool, StorageError> {
        self.scripts.remove(id);
        Ok(true)
    }

    fn get_all(&self) -> Result<Vec<ScriptRecord>, StorageError> {
        let mut all: Vec<ScriptRecord> = self.scripts.values().cloned().collect();
        all.sort_by(|a, b| {
            a.installed_at
                .cmp(&b.installed_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(all)
    }

    fn record_package(&mut self, name: &str) -> Result<(), StorageError> {
        self.packages.insert(name.to_string(), now_millis());
        Ok(())
    }

    fn list_packages(&self) -> Result<Vec<ProvisionedPackage>, StorageError> {
        let mut out: Vec<ProvisionedPackage> = self
            .packages
            .iter()
            .map(|(name, at)| ProvisionedPackage {
                name: name.clone(),
                provisioned_at: *at,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}
