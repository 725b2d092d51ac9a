//! World connection error types

use thiserror::Error;

/// World connection error type
#[derive(Debug, Error)]
pub enum WorldError {
    /// No socket is open
    #[error("Not connected to the world server")]
    NotConnected,

    /// Socket I/O failed
    #[error("World server I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded
    #[error("Invalid frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// World connection result type
pub type WorldResult<T> = Result<T, WorldError>;
