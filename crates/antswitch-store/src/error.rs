//! Error types for the persistence layer

use thiserror::Error;

/// Errors raised by store backends
///
/// A missing key is never an error: getters return the caller's default.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Read or write attempted outside a `begin`/`end` batch
    #[error("no namespace open")]
    NotOpen,

    /// `begin` called while another batch is open
    #[error("namespace {0} is already open")]
    AlreadyOpen(String),

    /// Write attempted in a read-only batch
    #[error("namespace {0} is open read-only")]
    ReadOnly(String),

    /// No location for the store file could be determined
    #[error("could not determine store path")]
    NoPath,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file is not valid JSON
    #[error("malformed store file: {0}")]
    Json(#[from] serde_json::Error),
}
