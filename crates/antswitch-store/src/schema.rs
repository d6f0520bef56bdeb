//! Persisted switch state schema
//!
//! Each entity is one key holding one record. Scalar settings use native
//! store types; structured entities are JSON strings. Every field has a
//! default that applies when its key is absent or unreadable.
//!
//! | Key | Kind | Content |
//! |-----|------|---------|
//! | `schema` | u32 | [`SCHEMA_VERSION`] |
//! | `allow_cross` | bool | interlock override |
//! | `grid` | string | connection grid |
//! | `port_names` | string | COM1/COM2 names |
//! | `antenna_names` | string | antenna names |
//! | `device` | string | device settings |
//! | `preset_count` | u32 | number of presets |
//! | `preset.{i}` | string | preset `i` |

use antswitch_core::{
    AntennaNames, ConnectionGrid, DeviceSettings, Preset, RadioPortNames, MAX_PRESETS,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// Namespace holding all switch keys
pub const NAMESPACE: &str = "antswitch";

/// Current record layout version
pub const SCHEMA_VERSION: u32 = 1;

mod keys {
    pub const SCHEMA: &str = "schema";
    pub const ALLOW_CROSS: &str = "allow_cross";
    pub const GRID: &str = "grid";
    pub const PORT_NAMES: &str = "port_names";
    pub const ANTENNA_NAMES: &str = "antenna_names";
    pub const DEVICE: &str = "device";
    pub const PRESET_COUNT: &str = "preset_count";

    pub fn preset(index: usize) -> String {
        format!("preset.{}", index)
    }
}

/// Everything the switch persists
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersistedState {
    /// Connection grid restored at boot
    pub grid: ConnectionGrid,
    /// Interlock override
    pub allow_cross_connection: bool,
    /// Radio port names
    pub port_names: RadioPortNames,
    /// Antenna names
    pub antenna_names: AntennaNames,
    /// Network identity
    pub device: DeviceSettings,
    /// Saved presets, in creation order
    pub presets: Vec<Preset>,
}

fn read_record<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let text = store.get_string(key, "");
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed record {}: {}", key, e);
            None
        }
    }
}

fn write_record<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let text = serde_json::to_string(value)?;
    store.put_string(key, &text)
}

/// Load the switch state, substituting defaults for anything missing
///
/// Only backend failures are errors. Absent keys and malformed records fall
/// back to defaults; presets beyond [`MAX_PRESETS`] are dropped.
pub fn load_state<S>(store: &mut S) -> Result<PersistedState, StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store.begin(NAMESPACE, true)?;
    let state = read_state(store);
    store.end()?;
    Ok(state)
}

fn read_state<S>(store: &S) -> PersistedState
where
    S: KeyValueStore + ?Sized,
{
    let version = store.get_u32(keys::SCHEMA, 0);
    if version == 0 {
        info!("No stored switch state, using defaults");
    } else if version > SCHEMA_VERSION {
        warn!(
            "Stored schema version {} is newer than {}, loading what is readable",
            version, SCHEMA_VERSION
        );
    }

    let mut count = store.get_u32(keys::PRESET_COUNT, 0) as usize;
    if count > MAX_PRESETS {
        warn!(
            "Store lists {} presets, keeping the first {}",
            count, MAX_PRESETS
        );
        count = MAX_PRESETS;
    }

    let presets: Vec<Preset> = (0..count)
        .filter_map(|i| {
            let preset = read_record(store, &keys::preset(i));
            if preset.is_none() {
                warn!("Preset {} missing from store, skipping", i);
            }
            preset
        })
        .collect();

    let state = PersistedState {
        grid: read_record(store, keys::GRID).unwrap_or_default(),
        allow_cross_connection: store.get_bool(keys::ALLOW_CROSS, false),
        port_names: read_record(store, keys::PORT_NAMES).unwrap_or_default(),
        antenna_names: read_record(store, keys::ANTENNA_NAMES).unwrap_or_default(),
        device: read_record(store, keys::DEVICE).unwrap_or_default(),
        presets,
    };

    debug!(
        "Loaded switch state: grid {}, override {}, {} presets",
        state.grid,
        state.allow_cross_connection,
        state.presets.len()
    );
    state
}

/// Write the full switch state in one batch
///
/// Stale preset keys above the new preset count are removed. The batch is
/// always closed, even when a write fails.
pub fn save_state<S>(store: &mut S, state: &PersistedState) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    store.begin(NAMESPACE, false)?;
    let written = write_state(store, state);
    let closed = store.end();
    written.and(closed)
}

fn write_state<S>(store: &mut S, state: &PersistedState) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
{
    let previous_count = store.get_u32(keys::PRESET_COUNT, 0) as usize;

    store.put_u32(keys::SCHEMA, SCHEMA_VERSION)?;
    store.put_bool(keys::ALLOW_CROSS, state.allow_cross_connection)?;
    write_record(store, keys::GRID, &state.grid)?;
    write_record(store, keys::PORT_NAMES, &state.port_names)?;
    write_record(store, keys::ANTENNA_NAMES, &state.antenna_names)?;
    write_record(store, keys::DEVICE, &state.device)?;

    store.put_u32(keys::PRESET_COUNT, state.presets.len() as u32)?;
    for (i, preset) in state.presets.iter().enumerate() {
        write_record(store, &keys::preset(i), preset)?;
    }
    for stale in state.presets.len()..previous_count {
        store.remove(&keys::preset(stale))?;
    }

    info!(
        "Saved switch state ({} presets, override {})",
        state.presets.len(),
        state.allow_cross_connection
    );
    Ok(())
}
