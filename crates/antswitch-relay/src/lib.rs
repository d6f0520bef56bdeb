//! Relay Actuation
//!
//! This crate turns a [`ConnectionGrid`](antswitch_core::ConnectionGrid) into
//! relay coil states. The switch engine calls [`RelayDriver::apply_grid`] once
//! per committed change with the complete grid, never a diff.
//!
//! Drivers:
//!
//! - **SerialRelayBoard**: LCUS-style USB relay boards over a serial port
//! - **SimulatedRelays**: records every applied grid, for tests and dry runs
//! - **LoggingRelays**: logs coil levels and does nothing else
//!
//! Every driver switches in break-before-make order: contacts that open are
//! released before contacts that close are energized.

pub mod driver;
pub mod error;
pub mod map;
pub mod serial;
pub mod sim;

pub use driver::{LoggingRelays, RelayDriver};
pub use error::RelayError;
pub use map::{RelayLevel, RelayMap, RELAY_CHANNELS};
pub use serial::{lcus_frame, SerialRelayBoard, DEFAULT_BAUD_RATE};
pub use sim::SimulatedRelays;
