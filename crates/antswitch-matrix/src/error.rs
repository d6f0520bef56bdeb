//! Error types for the switch engine

use antswitch_core::AntennaSlot;
use antswitch_store::StoreError;
use thiserror::Error;

fn join_slots(slots: &[AntennaSlot]) -> String {
    slots
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur in the switch engine
///
/// None of these are fatal. The live state is unchanged whenever one is
/// returned from a mutation.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Change would connect both radios to one antenna with the override off
    #[error("cross-connection rejected: {} would be shared by both radios", join_slots(.conflicts))]
    DangerRejected {
        /// Antennas that would be shared
        conflicts: Vec<AntennaSlot>,
    },

    /// Preset store is full
    #[error("preset store full ({capacity} presets)")]
    CapacityExceeded {
        /// Maximum number of presets
        capacity: usize,
    },

    /// No preset at the requested index
    #[error("preset {index} not found ({len} saved)")]
    NotFound {
        /// Requested index
        index: usize,
        /// Number of saved presets
        len: usize,
    },

    /// Persistence backend failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The switch actor is no longer running
    #[error("switch actor stopped")]
    ActorStopped,
}

impl SwitchError {
    /// Stable machine-readable code for the control surface
    pub fn code(&self) -> &'static str {
        match self {
            SwitchError::DangerRejected { .. } => "danger_rejected",
            SwitchError::CapacityExceeded { .. } => "capacity_exceeded",
            SwitchError::NotFound { .. } => "not_found",
            SwitchError::Store(_) => "store_failed",
            SwitchError::ActorStopped => "actor_stopped",
        }
    }
}
