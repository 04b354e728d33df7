//! SQLite implementation of [`ScriptStore`].
//!
//! [`SqliteStore`] persists scripts in a SQLite database with WAL mode,
//! atomic transactions on every write, and automatic schema migrations.
//! The package list is stored as a JSON TEXT column via serde_json.

use rusqlite::{params, Connection, OptionalExtension, Row};

use hybrid_core::{ScriptFields, ScriptId, ScriptRecord};

use crate::error::StorageError;
use crate::traits::ScriptStore;
use crate::types::{now_millis, ProvisionedPackage};

const SELECT_SCRIPT: &str = "SELECT id, name, description, author, version, code, entry_point, packages_json, installed_at, updated_at FROM scripts";

/// SQLite-backed implementation of [`ScriptStore`].
///
/// Every write operation is wrapped in a transaction for atomicity.
pub struct SqliteStore {
    conn: Connection,
}

/// Raw column values of one `scripts` row, before JSON decoding.
type ScriptRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    i64,
    i64,
);

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteStore { conn })
    }

    /// Opens an in-memory SQLite database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore { conn })
    }

    fn read_row(row: &Row<'_>) -> rusqlite::Result<ScriptRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
            row.get(9)?,
        ))
    }

    fn into_record(raw: ScriptRow) -> Result<ScriptRecord, StorageError> {
        let (
            id,
            name,
            description,
            author,
            version,
            code,
            entry_point,
            packages_json,
            installed_at,
            updated_at,
        ) = raw;
        let packages: Vec<String> = serde_json::from_str(&packages_json)?;
        let id = ScriptId::new(id.clone()).map_err(|e| StorageError::Corrupt {
            id,
            reason: e.to_string(),
        })?;
        Ok(ScriptRecord {
            id,
            fields: ScriptFields {
                name,
                description,
                author,
                version,
                code,
                entry_point,
                packages,
            },
            installed_at,
            updated_at,
        })
    }
}

impl ScriptStore for SqliteStore {
    fn save(&mut self, id: &ScriptId, fields: &ScriptFields) -> Result<ScriptId, StorageError> {
        let packages_json = serde_json::to_string(&fields.packages)?;
        let now = now_millis();

        let tx = self.conn.transaction()?;
        // installed_at is written on insert only; the upsert keeps the old one.
        tx.execute(
            "INSERT INTO scripts (id, name, description, author, version, code, entry_point, packages_json, installed_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 author = excluded.author,
                 version = excluded.version,
                 code = excluded.code,
                 entry_point = excluded.entry_point,
                 packages_json = excluded.packages_json,
                 updated_at = excluded.updated_at",
            params![
                id.as_str(),
                fields.name,
                fields.description,
                fields.author,
                fields.version,
                fields.code,
                fields.entry_point,
                packages_json,
                now,
            ],
        )?;
        tx.commit()?;
        Ok(id.clone())
    }

    fn load(&self, id: &ScriptId) -> Result<Option<ScriptRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                &format!("{SELECT_SCRIPT} WHERE id = ?1"),
                params![id.as_str()],
                Self::read_row,
            )
            .optional()?;

        row.map(Self::into_record).transpose()
    }

    fn delete(&mut self, id: &ScriptId) -> Result<bool, StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM scripts WHERE id = ?1", params![id.as_str()])?;
        tx.commit()?;
        Ok(true)
    }

    fn get_all(&self) -> Result<Vec<ScriptRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_SCRIPT} ORDER BY installed_at, id"))?;
        let rows = stmt.query_map([], Self::read_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(Self::into_record(row?)?);
        }
        Ok(result)
    }

    fn record_package(&mut self, name: &str) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO packages (name, provisioned_at) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET provisioned_at = excluded.provisioned_at",
            params![name, now_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn list_packages(&self) -> Result<Vec<ProvisionedPackage>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT name, provisioned_at FROM packages ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(ProvisionedPackage {
                name: row.get(0)?,
                provisioned_at: row.get(1)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}
