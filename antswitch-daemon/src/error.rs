//! Daemon error types

use antswitch_matrix::SwitchError;
use antswitch_relay::RelayError;
use antswitch_store::StoreError;
use thiserror::Error;

/// Errors that stop the daemon
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("switch error: {0}")]
    Switch(#[from] SwitchError),

    #[error("settings error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("switch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
