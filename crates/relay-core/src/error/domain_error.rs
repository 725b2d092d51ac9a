//! Domain errors - error types for the relay domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Chat Gateway Errors
    // =========================================================================
    #[error("Chat channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Invalid chat channel id: {0}")]
    InvalidChannelId(String),

    #[error("Chat gateway error: {0}")]
    Gateway(String),
}

impl DomainError {
    /// Whether the error is a missing/unknown channel
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound(_) | Self::InvalidChannelId(_))
    }
}
