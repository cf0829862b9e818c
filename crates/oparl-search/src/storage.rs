//! Key/value persistence for saved searches
//!
//! Mirrors the browser's local storage contract: string keys, string values,
//! and writes that may fail (quota, permissions). Callers treat a missing
//! store as "saving unavailable".

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store cannot be used at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Reading failed
    #[error("failed to read {path}: {source}")]
    Read {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Writing failed
    #[error("failed to write {key}: {message}")]
    Write {
        /// Key being written
        key: String,
        /// Failure description
        message: String,
    },

    /// The backing file is not a string map
    #[error("malformed storage file {path}: {message}")]
    Malformed {
        /// Backing file
        path: PathBuf,
        /// Decoder message
        message: String,
    },
}

/// String key/value store
pub trait SearchStorage: Send + Sync {
    /// Value stored under `key`
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store; writes can be made to fail
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    reject_writes: Mutex<bool>,
}

impl MemoryStorage {
    /// Create empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (simulates an exhausted quota)
    pub fn reject_writes(&self, reject: bool) {
        *self.reject_writes.lock() = reject;
    }
}

impl SearchStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if *self.reject_writes.lock() {
            return Err(StorageError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            });
        }
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a single file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (creating if needed) the store at `path`
    ///
    /// # Errors
    /// [`StorageError::Unavailable`] when the file cannot be created or read
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, "{}").map_err(|e| {
                StorageError::Unavailable(format!("cannot create {}: {e}", path.display()))
            })?;
        }
        let storage = Self {
            path,
            lock: Mutex::new(()),
        };
        storage
            .read_map()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        debug!(path = %storage.path.display(), "opened saved-search storage");
        Ok(storage)
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write_map(&self, key: &str, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let write_error = |message: String| StorageError::Write {
            key: key.to_string(),
            message,
        };
        let encoded = serde_json::to_string_pretty(map).map_err(|e| write_error(e.to_string()))?;
        fs::write(&self.path, encoded).map_err(|e| write_error(e.to_string()))
    }
}

impl SearchStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(key, &map)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(key, &map)?;
        }
        Ok(())
    }
}
