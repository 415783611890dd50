//! SQLite-backed collection store.
//!
//! Each collection is a single JSON document in the `collections` table,
//! replaced wholesale on every save.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::StorageError;

use super::{quarantined_name, Store};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS collections (
                name       TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
    }

    /// Names of all stored collections, sorted.
    pub fn collections(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

impl Store for SqliteStore {
    fn save(&self, collection: &str, body: &serde_json::Value) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO collections (name, body, updated_at) VALUES (?1, ?2, ?3)",
            params![collection, body.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load(&self, collection: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM collections WHERE name = ?1")?;
        let body = match stmt.query_row(params![collection], |row| row.get::<_, String>(0)) {
            Ok(body) => body,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                collection: collection.to_string(),
                source,
            })
    }

    fn quarantine(&self, collection: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE OR REPLACE collections SET name = ?2 WHERE name = ?1",
            params![collection, quarantined_name(collection)],
        )?;
        Ok(())
    }
}
