//! Antenna Switch Persistence
//!
//! The switch keeps its state in a flat key/value store grouped into
//! namespaces, the way small controllers use NVS or preferences storage.
//! This crate provides:
//!
//! - **KeyValueStore**: the narrow store interface (typed getters with
//!   defaults, setters, namespace batches)
//! - **MemoryStore** and **JsonFileStore** backends
//! - **Schema**: [`load_state`] and [`save_state`], which map a
//!   [`PersistedState`] onto versioned per-entity JSON records
//!
//! # Example
//!
//! ```rust
//! use antswitch_store::{load_state, save_state, MemoryStore, PersistedState};
//!
//! let mut store = MemoryStore::new();
//! let mut state = PersistedState::default();
//! state.allow_cross_connection = true;
//!
//! save_state(&mut store, &state).unwrap();
//! assert_eq!(load_state(&mut store).unwrap(), state);
//! ```

pub mod error;
pub mod file;
pub mod kv;
pub mod memory;
pub mod schema;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use kv::{KeyValueStore, StoredValue};
pub use memory::MemoryStore;
pub use schema::{load_state, save_state, PersistedState, NAMESPACE, SCHEMA_VERSION};
