//! Error types for the switch data model

use thiserror::Error;

/// Errors raised when building model values from untrusted input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Antenna index outside 0..4
    #[error("invalid antenna slot: {0} (expected 0..=3)")]
    InvalidSlot(u8),

    /// Radio port name that is neither COM1 nor COM2
    #[error("unknown radio port: {0}")]
    UnknownPort(String),
}
