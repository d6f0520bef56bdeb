//! JSON file store backend
//!
//! The whole store lives in one JSON document, `{namespace: {key: value}}`.
//! A writable batch is flushed to disk when it ends; the file is replaced
//! through a temporary sibling so a crash never leaves half a document.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StoreError;
use crate::kv::{KeyValueStore, Namespaces, StoredValue};

/// Store persisted as a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: Namespaces,
    dirty: bool,
}

impl JsonFileStore {
    /// Get the XDG config directory for antswitch
    /// Uses $XDG_CONFIG_HOME/antswitch, falls back to ~/.config/antswitch
    pub fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("antswitch"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("antswitch"))
    }

    /// Default store file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("store.json"))
    }

    /// Open the store at the default location
    pub fn open_default() -> Result<Self, StoreError> {
        let path = Self::default_path().ok_or(StoreError::NoPath)?;
        Self::open(path)
    }

    /// Open a store file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data: BTreeMap<String, BTreeMap<String, StoredValue>> =
            match std::fs::read_to_string(&path) {
                Ok(text) => serde_json::from_str(&text)?,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    info!("No store at {}, starting empty", path.display());
                    BTreeMap::new()
                }
                Err(e) => return Err(e.into()),
            };

        Ok(Self {
            path,
            inner: Namespaces::with_data(data),
            dirty: false,
        })
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.inner.data)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        debug!("Flushed store to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StoreError> {
        self.inner.begin(namespace, read_only)
    }

    fn end(&mut self) -> Result<(), StoreError> {
        let writable = self.inner.end()?;
        if writable && self.dirty {
            self.flush()?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<StoredValue> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.inner.put(key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)?;
        self.dirty = true;
        Ok(())
    }
}
