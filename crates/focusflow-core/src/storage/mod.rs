//! Storage collaborators and application configuration.
//!
//! The ledger and planner persist whole collections through the [`Store`]
//! trait; which backend sits behind it is chosen by the composition root.

mod config;
pub mod database;
pub mod json_file;
pub mod memory;

pub use config::{
    AutomationConfig, Config, NotificationsConfig, StorageBackend, StorageConfig, TimerConfig,
    UiConfig,
};
pub use database::SqliteStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

pub const SESSIONS_COLLECTION: &str = "sessions";
pub const PLANNER_COLLECTION: &str = "planner_events";

/// Durable key -> JSON document store, one document per collection.
pub trait Store: Send {
    fn save(&self, collection: &str, body: &serde_json::Value) -> Result<(), StorageError>;

    /// `Ok(None)` when the collection has never been saved.
    fn load(&self, collection: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Move an unreadable collection aside so the next `save` starts a
    /// fresh one without overwriting it. A missing collection is `Ok`.
    fn quarantine(&self, collection: &str) -> Result<(), StorageError>;
}

/// Name a quarantined collection is kept under.
pub fn quarantined_name(collection: &str) -> String {
    format!("{collection}.corrupt")
}

/// Serialize `records` and save them as `collection`.
pub fn save_records<T: Serialize>(
    store: &dyn Store,
    collection: &str,
    records: &[T],
) -> Result<(), StorageError> {
    let body = serde_json::to_value(records).map_err(|source| StorageError::Serialize {
        collection: collection.to_string(),
        source,
    })?;
    store.save(collection, &body)
}

/// Load `collection` as a list of records; a missing collection is empty.
pub fn load_records<T: DeserializeOwned>(
    store: &dyn Store,
    collection: &str,
) -> Result<Vec<T>, StorageError> {
    match store.load(collection)? {
        Some(body) => serde_json::from_value(body).map_err(|source| StorageError::Corrupt {
            collection: collection.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

/// Returns the data directory, creating it if needed.
///
/// `FOCUSFLOW_DATA_DIR` overrides the location. Otherwise
/// `~/.config/focusflow[-dev]/`, with the `-dev` suffix when
/// `FOCUSFLOW_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUSFLOW_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusflow-dev")
            } else {
                base_dir.join("focusflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Open the store selected by `config.storage.backend` in `dir`.
pub fn open_store(config: &Config, dir: &std::path::Path) -> Result<Box<dyn Store>, StorageError> {
    Ok(match config.storage.backend {
        StorageBackend::Json => Box::new(JsonFileStore::new(dir)?),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(&dir.join("focusflow.db"))?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_round_trip_through_store() {
        let store = MemoryStore::new();
        save_records(&store, "numbers", &[1u32, 2, 3]).unwrap();
        let loaded: Vec<u32> = load_records(&store, "numbers").unwrap();
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[test]
    fn missing_collection_loads_empty() {
        let store = MemoryStore::new();
        let loaded: Vec<u32> = load_records(&store, "nothing").unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn wrong_shape_is_reported_as_corrupt() {
        let store = MemoryStore::new();
        store
            .save("numbers", &serde_json::json!({"not": "a list"}))
            .unwrap();
        let err = load_records::<u32>(&store, "numbers").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
