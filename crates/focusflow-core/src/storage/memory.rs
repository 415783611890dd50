use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::StorageError;

use super::{quarantined_name, Store};

/// In-process store. Clones share the same map, so a test can keep a
/// handle and inspect what a ledger persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn save(&self, collection: &str, body: &serde_json::Value) -> Result<(), StorageError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(collection.to_string(), body.clone());
        Ok(())
    }

    fn load(&self, collection: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .cloned())
    }

    fn quarantine(&self, collection: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(body) = map.remove(collection) {
            map.insert(quarantined_name(collection), body);
        }
        Ok(())
    }
}
