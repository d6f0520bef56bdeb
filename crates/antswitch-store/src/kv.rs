//! Key/value store interface

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    /// Boolean flag
    Bool(bool),
    /// Unsigned integer
    U32(u32),
    /// Text, including JSON-encoded records
    Str(String),
}

/// Durable flat key/value store with namespaced batches
///
/// Reads and writes happen between [`begin`](KeyValueStore::begin) and
/// [`end`](KeyValueStore::end). Backends may defer durability until `end`.
pub trait KeyValueStore: Send {
    /// Open a namespace for a batch of reads or writes
    fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StoreError>;

    /// Close the open namespace, flushing writes
    fn end(&mut self) -> Result<(), StoreError>;

    /// Raw lookup in the open namespace
    fn get(&self, key: &str) -> Option<StoredValue>;

    /// Raw write in the open namespace
    fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError>;

    /// Delete a key from the open namespace (absent keys are fine)
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Boolean value, or `default` if absent or of another type
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(StoredValue::Bool(value)) => value,
            _ => default,
        }
    }

    /// String value, or `default` if absent or of another type
    fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(StoredValue::Str(value)) => value,
            _ => default.to_string(),
        }
    }

    /// Unsigned value, or `default` if absent or of another type
    fn get_u32(&self, key: &str, default: u32) -> u32 {
        match self.get(key) {
            Some(StoredValue::U32(value)) => value,
            _ => default,
        }
    }

    /// Store a boolean
    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.put(key, StoredValue::Bool(value))
    }

    /// Store a string
    fn put_string(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.put(key, StoredValue::Str(value.to_string()))
    }

    /// Store an unsigned integer
    fn put_u32(&mut self, key: &str, value: u32) -> Result<(), StoreError> {
        self.put(key, StoredValue::U32(value))
    }
}

/// Open batch bookkeeping
#[derive(Debug, Clone)]
struct OpenBatch {
    namespace: String,
    read_only: bool,
}

/// Namespaced maps plus the currently open batch
///
/// Shared by the in-memory and file backends.
#[derive(Debug, Clone, Default)]
pub(crate) struct Namespaces {
    pub(crate) data: BTreeMap<String, BTreeMap<String, StoredValue>>,
    open: Option<OpenBatch>,
}

impl Namespaces {
    pub(crate) fn with_data(data: BTreeMap<String, BTreeMap<String, StoredValue>>) -> Self {
        Self { data, open: None }
    }

    pub(crate) fn begin(&mut self, namespace: &str, read_only: bool) -> Result<(), StoreError> {
        if let Some(open) = &self.open {
            return Err(StoreError::AlreadyOpen(open.namespace.clone()));
        }
        self.open = Some(OpenBatch {
            namespace: namespace.to_string(),
            read_only,
        });
        Ok(())
    }

    /// Close the batch, returning whether it was writable
    pub(crate) fn end(&mut self) -> Result<bool, StoreError> {
        let open = self.open.take().ok_or(StoreError::NotOpen)?;
        Ok(!open.read_only)
    }

    pub(crate) fn get(&self, key: &str) -> Option<StoredValue> {
        let Some(open) = &self.open else {
            warn!("Store read of {} outside a namespace batch", key);
            return None;
        };
        self.data.get(&open.namespace)?.get(key).cloned()
    }

    fn writable(&mut self) -> Result<&mut BTreeMap<String, StoredValue>, StoreError> {
        let open = self.open.as_ref().ok_or(StoreError::NotOpen)?;
        if open.read_only {
            return Err(StoreError::ReadOnly(open.namespace.clone()));
        }
        Ok(self.data.entry(open.namespace.clone()).or_default())
    }

    pub(crate) fn put(&mut self, key: &str, value: StoredValue) -> Result<(), StoreError> {
        self.writable()?.insert(key.to_string(), value);
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.writable()?.remove(key);
        Ok(())
    }
}
