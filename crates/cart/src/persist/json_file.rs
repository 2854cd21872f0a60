//! JSON file backend.
//!
//! Persists the whole key map as one JSON object in a single file, written
//! to a temporary sibling and renamed into place so readers never observe a
//! half-written file. No change notices - processes sharing a file converge
//! through the reconciliation poll.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;
use crate::persist::StorageBackend;

/// A [`StorageBackend`] backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Use `path` as the store. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this backend reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read-for-update: an unparseable existing file counts as empty, the
    /// same recovery the read side applies, so the next write repairs the
    /// file instead of locking persistence out forever.
    fn read_map_for_update(&self) -> Result<HashMap<String, String>, StorageError> {
        match self.read_map() {
            Ok(map) => Ok(map),
            Err(StorageError::Serialization(e)) => {
                warn!(
                    error = %e,
                    path = %self.path.display(),
                    "corrupt store file, rewriting from empty"
                );
                Ok(HashMap::new())
            }
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StorageError> {
        let payload = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_map_for_update()?;
        map.insert(key.to_owned(), value.to_owned());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map_for_update()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
