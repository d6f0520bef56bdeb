//! Events emitted by the switch controller
//!
//! Observers (logs, a UI, a status LED) receive these after each request has
//! been fully handled, in the order the changes happened.

use antswitch_core::{AntennaSlot, ConnectionGrid, Decision, RadioPort};

/// What caused a grid change or rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A single contact was toggled
    Cell {
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
    },
    /// A preset was restored
    Preset { index: usize },
}

/// Switch activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    /// The live grid changed and the relays were driven
    GridChanged {
        /// New live grid
        grid: ConnectionGrid,
        /// Interlock decision for the change
        decision: Decision,
        /// Request that caused it
        source: ChangeSource,
    },

    /// The interlock refused a change
    MutationRejected {
        /// Antennas that would have been shared
        conflicts: Vec<AntennaSlot>,
        /// Request that was refused
        source: ChangeSource,
    },

    /// A preset was appended
    PresetSaved {
        /// Index of the new preset
        index: usize,
        /// Its name
        name: String,
    },

    /// The override flag changed
    PolicyChanged {
        /// New override setting
        allow_cross_connection: bool,
    },

    /// Names or device settings were updated
    SettingsChanged,

    /// Full state written to the store
    StateSaved,
}

impl SwitchEvent {
    /// Whether this event reports a cross-connection (committed or refused)
    pub fn is_interlock_alert(&self) -> bool {
        matches!(
            self,
            SwitchEvent::MutationRejected { .. }
                | SwitchEvent::GridChanged {
                    decision: Decision::AllowedWithWarning,
                    ..
                }
        )
    }

    /// The grid carried by this event, if any
    pub fn grid(&self) -> Option<&ConnectionGrid> {
        match self {
            SwitchEvent::GridChanged { grid, .. } => Some(grid),
            _ => None,
        }
    }
}
