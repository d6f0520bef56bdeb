//! Antenna Switch Engine
//!
//! This crate owns the live state of the antenna switch and enforces the
//! cross-connection interlock on every change.
//!
//! # Architecture
//!
//! - **SwitchMatrix** holds the single live [`ConnectionGrid`] and drives the
//!   relays after each commit
//! - **PresetStore** keeps up to [`MAX_PRESETS`] named grid snapshots
//! - **SwitchController** bundles matrix, interlock policy, presets, names and
//!   device settings into one owned aggregate, and loads/saves it through a
//!   [`KeyValueStore`]
//! - **ControlSurface** maps control requests onto controller calls and
//!   answers with a full state snapshot
//! - **Actor**: one task owns the control surface; every request is handled
//!   to completion before the next, so read-modify-write never interleaves
//!
//! # Example
//!
//! ```rust
//! use antswitch_core::{AntennaSlot, RadioPort};
//! use antswitch_matrix::{SwitchController, SwitchError};
//! use antswitch_relay::SimulatedRelays;
//!
//! let mut controller = SwitchController::new(Box::new(SimulatedRelays::new()));
//! let ant3 = AntennaSlot::new(2).unwrap();
//!
//! controller.set_cell(RadioPort::Primary, ant3, true).unwrap();
//! let result = controller.set_cell(RadioPort::Secondary, ant3, true);
//! assert!(matches!(result, Err(SwitchError::DangerRejected { .. })));
//! ```
//!
//! [`ConnectionGrid`]: antswitch_core::ConnectionGrid
//! [`MAX_PRESETS`]: antswitch_core::MAX_PRESETS
//! [`KeyValueStore`]: antswitch_store::KeyValueStore

pub mod actor;
pub mod control;
pub mod controller;
pub mod error;
pub mod events;
pub mod matrix;
pub mod presets;

pub use actor::{run_switch_actor, spawn_switch_actor, SwitchActorCommand, SwitchHandle};
pub use control::{ControlFailure, ControlRequest, ControlResponse, ControlSurface, ResponseStatus};
pub use controller::{
    DeviceUpdate, PresetSummary, SettingsUpdate, Snapshot, SwitchController, EVENT_BUFFER_LIMIT,
};
pub use error::SwitchError;
pub use events::{ChangeSource, SwitchEvent};
pub use matrix::{Commit, SwitchMatrix};
pub use presets::PresetStore;
