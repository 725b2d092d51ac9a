//! Application error types
//!
//! Startup, wiring and task failures of the relay binary. Runtime relay failures
//! (socket errors, unmapped channels, rate limiting) never surface here: the
//! relay engine absorbs them locally.

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    // Chat platform errors
    #[error("Chat gateway error: {0}")]
    ChatGateway(String),

    // Health server errors
    #[error("Health server error: {0}")]
    HealthServer(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78, // EX_CONFIG
            _ => 1,
        }
    }

    /// Whether this error comes from bad configuration
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
