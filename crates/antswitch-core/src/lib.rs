//! Antenna Switch Core
//!
//! This crate holds the data model and the interlock rule for a coaxial
//! antenna switch matrix with two radio ports (COM1, COM2) and four antennas:
//!
//! - **Grid**: [`ConnectionGrid`], the 2×4 table of relay contacts
//! - **Interlock**: [`is_dangerous`] and [`evaluate`], deciding whether a
//!   proposed grid may be committed
//! - **Presets**: the [`Preset`] snapshot type and the [`MAX_PRESETS`] bound
//! - **Names and settings**: display names and persisted device settings
//!
//! Nothing in this crate owns state or performs I/O. The switch engine lives
//! in `antswitch-matrix`.
//!
//! # Example
//!
//! ```rust
//! use antswitch_core::{evaluate, AntennaSlot, ConnectionGrid, Decision, RadioPort};
//!
//! let slot = AntennaSlot::new(2).unwrap();
//! let grid = ConnectionGrid::default()
//!     .with_cell(RadioPort::Primary, slot, true)
//!     .with_cell(RadioPort::Secondary, slot, true);
//!
//! assert_eq!(evaluate(&grid, false), Decision::Rejected);
//! assert_eq!(evaluate(&grid, true), Decision::AllowedWithWarning);
//! ```

pub mod device;
pub mod error;
pub mod grid;
pub mod interlock;
pub mod names;
pub mod preset;

pub use device::DeviceSettings;
pub use error::CoreError;
pub use grid::{AntennaSlot, ConnectionGrid, RadioPort, PORT_COUNT, SLOT_COUNT};
pub use interlock::{conflicting_slots, evaluate, is_dangerous, Decision, InterlockPolicy};
pub use names::{AntennaNames, RadioPortNames};
pub use preset::{Preset, MAX_PRESETS};
