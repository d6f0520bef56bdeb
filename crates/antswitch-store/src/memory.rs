//! In-memory store backend

use crate::error::StoreError;
use crate::kv::{KeyValueStore, Namespaces, StoredValue};

/// Volatile store, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Namespaces,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys stored under a namespace
    pub fn key_count(&self, namespace: &str) -> usize {
        self.inner.data.get(namespace).map_or(0, |keys| keys.len())
    }

    /// Whether a key exists, regardless of any open batch
    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.inner
            .data
            .get(namespace)
            .is_some_and(|keys| keys.contains_key(key))
    }
}

impl KeyValueStore for MemoryStore {
    fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StoreError> {
        self.inner.begin(namespace, read_only)
    }

    fn end(&mut self) -> Result<(), StoreError> {
        self.inner.end().map(|_| ())
    }

    fn get(&self, key: &str) -> Option<StoredValue> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.inner.put(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }
}
