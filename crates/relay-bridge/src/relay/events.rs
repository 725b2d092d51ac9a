//! Events posted to the relay dispatcher

use relay_core::ChatMessage;

/// Events from the chat side and the process
#[derive(Debug, Clone)]
pub enum RelayEvent {
    /// Logged in to the chat platform
    ChatReady { user: String },

    /// Gateway session resumed after a drop
    ChatResumed,

    /// A message was posted in a channel the bot can read
    ChatMessage(ChatMessage),

    /// Stop relaying and close the world connection
    Shutdown,
}

impl RelayEvent {
    /// Get the event type name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatReady { .. } => "chat_ready",
            Self::ChatResumed => "chat_resumed",
            Self::ChatMessage(_) => "chat_message",
            Self::Shutdown => "shutdown",
        }
    }
}
