//! Channel mapping entity - pairs a world channel tag with a chat channel id

use serde::{Deserialize, Serialize};

/// A configured pairing between a world-server channel tag and a chat channel.
///
/// Mappings are loaded once at startup and never change afterwards. In the
/// configuration file the fields are spelled `mud` and `discord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelMapping {
    /// Channel tag on the world server (e.g. `"gossip"`)
    #[serde(rename = "mud", alias = "world")]
    pub world_channel: String,

    /// Chat channel identifier (a Discord channel snowflake, as a string)
    #[serde(rename = "discord", alias = "chat")]
    pub chat_channel: String,
}

impl ChannelMapping {
    /// Create a new mapping
    #[must_use]
    pub fn new(world_channel: impl Into<String>, chat_channel: impl Into<String>) -> Self {
        Self {
            world_channel: world_channel.into(),
            chat_channel: chat_channel.into(),
        }
    }
}
