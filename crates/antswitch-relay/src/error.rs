//! Error types for relay drivers

use thiserror::Error;

/// Errors raised while setting up a relay driver
///
/// Once a driver is running, write failures are logged rather than returned:
/// the switch engine treats actuation as infallible.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Channel number outside the board
    #[error("relay channel {0} out of range (board has {1} channels)")]
    InvalidChannel(u8, usize),

    /// Two cells mapped onto the same relay
    #[error("relay channel {0} assigned to more than one contact")]
    DuplicateChannel(u8),

    /// Failed to open serial port
    #[error("failed to open relay board {port}: {source}")]
    OpenFailed {
        port: String,
        #[source]
        source: serialport::Error,
    },
}
