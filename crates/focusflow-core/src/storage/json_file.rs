//! One pretty-printed `<collection>.json` file per collection.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

use super::{quarantined_name, Store};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` as the backing directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }
}

fn rename(from: &Path, to: &Path) -> Result<(), StorageError> {
    std::fs::rename(from, to).map_err(|source| StorageError::Io {
        path: to.to_path_buf(),
        source,
    })
}

impl Store for JsonFileStore {
    fn save(&self, collection: &str, body: &serde_json::Value) -> Result<(), StorageError> {
        let path = self.path(collection);
        let content =
            serde_json::to_string_pretty(body).map_err(|source| StorageError::Serialize {
                collection: collection.to_string(),
                source,
            })?;
        // Readers see either the old or the new file, never a partial one.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;
        rename(&tmp, &path)
    }

    fn load(&self, collection: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let path = self.path(collection);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                collection: collection.to_string(),
                source,
            })
    }

    fn quarantine(&self, collection: &str) -> Result<(), StorageError> {
        let path = self.path(collection);
        if !path.exists() {
            return Ok(());
        }
        let aside = self.dir.join(format!("{}.json", quarantined_name(collection)));
        rename(&path, &aside)
    }
}
