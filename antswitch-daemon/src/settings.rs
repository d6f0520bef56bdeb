//! Daemon settings

use std::path::{Path, PathBuf};

use antswitch_relay::DEFAULT_BAUD_RATE;
use antswitch_store::JsonFileStore;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which relay driver the daemon runs with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayDriverKind {
    /// Record grids in memory only
    #[default]
    Simulated,
    /// Log coil levels
    Logging,
    /// LCUS USB relay board on `serial_port`
    Serial,
}

/// Daemon settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonSettings {
    /// Store file; the XDG default when absent
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Relay driver
    #[serde(default)]
    pub relay_driver: RelayDriverKind,
    /// Serial port of the relay board
    #[serde(default)]
    pub serial_port: String,
    /// Baud rate of the relay board
    #[serde(default = "default_baud")]
    pub baud_rate: u32,
    /// Relay board energizes on low
    #[serde(default)]
    pub active_low: bool,
    /// Capacity of the request and event channels
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_baud() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_event_capacity() -> usize {
    64
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            store_path: None,
            relay_driver: RelayDriverKind::Simulated,
            serial_port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            active_low: false,
            event_capacity: default_event_capacity(),
        }
    }
}

impl DaemonSettings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        JsonFileStore::config_dir().map(|p| p.join("daemon.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&text) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, String> {
        let path =
            Self::settings_path().ok_or_else(|| "Could not determine settings path".to_string())?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to a file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {}", e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, json).map_err(|e| format!("Failed to write settings: {}", e))?;

        Ok(())
    }

    /// Store file to open
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path.clone().or_else(JsonFileStore::default_path)
    }
}
