// Key-value persistence for serialized documents.

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{EditError, Result};

/// Storage medium for persisted values, addressed by a fixed key
pub trait PersistenceStore {
    /// Read the value under `key`; `Ok(None)` when nothing was stored
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;
}

/// In-memory store holding JSON text per key, like browser local storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored text under `key`, as written
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store text under `key` without checking it
    pub fn insert_raw(&mut self, key: &str, text: impl Into<String>) {
        self.entries.insert(key.to_string(), text.into());
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.entries.get(key) {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Self {
        FileStore { base_path }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// File holding the value for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", key))
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("nothing stored at {}", path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            EditError::store(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Writes to a temporary file first, then renames it over the target
    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EditError::store(format!(
                    "failed to create directories for '{}': {}",
                    key, e
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| EditError::store(format!("failed to encode '{}': {}", key, e)))?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| {
            EditError::store(format!("failed to write '{}': {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            EditError::store(format!("failed to replace '{}': {}", path.display(), e))
        })?;

        debug!("stored {} at {}", key, path.display());
        Ok(())
    }
}
