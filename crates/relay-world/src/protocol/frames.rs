//! World server frame format

use serde::{Deserialize, Serialize};

/// Reserved channel carrying the pre-shared token after connect
pub const AUTH_CHANNEL: &str = "auth";

/// Reserved channel carrying keep-alive pings
pub const HEARTBEAT_CHANNEL: &str = "heartbeat";

/// Author name used on control frames
pub const CONTROL_NAME: &str = "bot";

/// Message body of a heartbeat frame
pub const HEARTBEAT_MESSAGE: &str = "ping";

/// A frame received from the world server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundWorldFrame {
    /// World channel tag
    pub channel: String,

    /// Speaker name
    pub name: String,

    /// Message text
    pub message: String,

    /// 1 when the message is an emote (rendered without the name prefix)
    #[serde(default)]
    pub emoted: i64,
}

impl InboundWorldFrame {
    /// Parse one line of JSON
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Whether the frame is an emote
    #[must_use]
    pub fn is_emoted(&self) -> bool {
        self.emoted == 1
    }

    /// Text as shown on the chat side
    ///
    /// Emotes are sent verbatim; speech is prefixed with `"<name>: "`.
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.is_emoted() {
            self.message.clone()
        } else {
            format!("{}: {}", self.name, self.message)
        }
    }
}

/// A frame written to the world server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundWorldFrame {
    pub channel: String,
    pub name: String,
    pub message: String,
}

impl OutboundWorldFrame {
    /// Create a chat frame
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create the `auth` control frame
    #[must_use]
    pub fn auth(token: impl Into<String>) -> Self {
        Self::new(AUTH_CHANNEL, CONTROL_NAME, token)
    }

    /// Create the `heartbeat` control frame
    #[must_use]
    pub fn heartbeat() -> Self {
        Self::new(HEARTBEAT_CHANNEL, CONTROL_NAME, HEARTBEAT_MESSAGE)
    }

    /// Whether this is a control frame rather than user content
    #[must_use]
    pub fn is_control(&self) -> bool {
        self.channel == AUTH_CHANNEL || self.channel == HEARTBEAT_CHANNEL
    }

    /// Serialize to one newline-terminated line of JSON
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
