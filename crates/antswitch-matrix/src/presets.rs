//! Preset store
//!
//! Append-only list of named grid snapshots, bounded by `MAX_PRESETS`.
//! Loading a preset only hands back a copy of its grid; the caller restores it
//! through the matrix so the interlock checks it again.

use antswitch_core::{ConnectionGrid, Preset, MAX_PRESETS};
use tracing::{info, warn};

use crate::error::SwitchError;

/// Bounded, ordered collection of presets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetStore {
    presets: Vec<Preset>,
}

impl PresetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted presets, dropping any beyond capacity
    pub fn from_presets(mut presets: Vec<Preset>) -> Self {
        if presets.len() > MAX_PRESETS {
            warn!(
                "Dropping {} presets beyond the limit of {}",
                presets.len() - MAX_PRESETS,
                MAX_PRESETS
            );
            presets.truncate(MAX_PRESETS);
        }
        Self { presets }
    }

    /// Append a snapshot of `grid`
    ///
    /// The grid is stored as given, even if it is cross-connected. A blank
    /// name becomes "Preset N".
    pub fn save(&mut self, name: &str, grid: ConnectionGrid) -> Result<usize, SwitchError> {
        if self.is_full() {
            warn!("Preset store full, not saving {:?}", name);
            return Err(SwitchError::CapacityExceeded {
                capacity: MAX_PRESETS,
            });
        }

        let index = self.presets.len();
        let name = match name.trim() {
            "" => format!("Preset {}", index + 1),
            trimmed => trimmed.to_string(),
        };

        info!("Saved preset {} {:?}: {}", index, name, grid);
        self.presets.push(Preset::new(name, grid));
        Ok(index)
    }

    /// Copy of a stored grid
    pub fn load(&self, index: usize) -> Result<ConnectionGrid, SwitchError> {
        self.presets
            .get(index)
            .map(|preset| *preset.grid())
            .ok_or(SwitchError::NotFound {
                index,
                len: self.presets.len(),
            })
    }

    /// Preset at an index
    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    /// `(index, name)` pairs in creation order
    pub fn list(&self) -> Vec<(usize, String)> {
        self.presets
            .iter()
            .enumerate()
            .map(|(i, preset)| (i, preset.name().to_string()))
            .collect()
    }

    /// All presets in creation order
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.presets.len() >= MAX_PRESETS
    }
}
