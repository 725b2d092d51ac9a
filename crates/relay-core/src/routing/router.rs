//! Channel router
//!
//! Bidirectional lookup over the static list of channel mappings.

use crate::entities::ChannelMapping;

/// Maps world channel tags to chat channel ids and back
///
/// Lookups scan the configured list in order and the first exact match wins.
/// A `None` result means the channel is not relayed.
#[derive(Debug, Clone, Default)]
pub struct ChannelRouter {
    mappings: Vec<ChannelMapping>,
}

impl ChannelRouter {
    /// Create a router over an ordered list of mappings
    #[must_use]
    pub fn new(mappings: Vec<ChannelMapping>) -> Self {
        Self { mappings }
    }

    /// Chat channel for a world channel tag
    pub fn world_to_chat(&self, world_channel: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.world_channel == world_channel)
            .map(|m| m.chat_channel.as_str())
    }

    /// World channel tag for a chat channel id
    pub fn chat_to_world(&self, chat_channel: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|m| m.chat_channel == chat_channel)
            .map(|m| m.world_channel.as_str())
    }

    /// Distinct chat channel ids, in configuration order
    pub fn chat_channels(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            if !seen.contains(&mapping.chat_channel.as_str()) {
                seen.push(&mapping.chat_channel);
            }
        }
        seen
    }

    /// All configured mappings
    pub fn mappings(&self) -> &[ChannelMapping] {
        &self.mappings
    }

    /// Number of mappings
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether no mappings are configured
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
