//! Chat gateway and health sink ports

use async_trait::async_trait;

use crate::error::DomainError;

/// Result type for chat gateway operations
pub type GatewayResult<T> = Result<T, DomainError>;

/// Channel metadata fetched from the chat platform at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub guild_id: Option<String>,
    pub guild_name: Option<String>,
}

// ============================================================================
// Chat Gateway
// ============================================================================

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Post text to a chat channel
    async fn send(&self, channel_id: &str, text: &str) -> GatewayResult<()>;

    /// Fetch channel metadata (used to validate and log mapped channels)
    async fn fetch_channel(&self, channel_id: &str) -> GatewayResult<ChannelInfo>;
}

// ============================================================================
// Health Sink
// ============================================================================

/// Counter and flag sink fed by the relay engine
pub trait HealthSink: Send + Sync {
    fn set_world_connected(&self, connected: bool);

    fn set_chat_connected(&self, connected: bool);

    fn increment_world_to_chat(&self);

    fn increment_chat_to_world(&self);
}

/// Health sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHealth;

impl HealthSink for NoopHealth {
    fn set_world_connected(&self, _connected: bool) {}

    fn set_chat_connected(&self, _connected: bool) {}

    fn increment_world_to_chat(&self) {}

    fn increment_chat_to_world(&self) {}
}
