use std::path::PathBuf;

/// Core error type for the monitor.
///
/// Adapter crates map their specific errors into this type so the monitor
/// loop can log every failure the same way and keep going.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("invalid state: {0}")]
    State(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
