//! Named grid snapshots

use crate::grid::ConnectionGrid;

/// Maximum number of presets the switch keeps
pub const MAX_PRESETS: usize = 5;

/// A named copy of the full connection grid
///
/// Presets are never edited after they are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Preset {
    name: String,
    grid: ConnectionGrid,
}

impl Preset {
    /// Create a preset
    pub fn new(name: impl Into<String>, grid: ConnectionGrid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored grid
    pub fn grid(&self) -> &ConnectionGrid {
        &self.grid
    }
}
