//! Test data builders

use relay_common::{RelaySettings, WorldConfig};
use relay_core::{ChannelMapping, ChatMessage, MentionedMember};
use serde_json::{json, Value};

/// Chat channel mapped to the world `town` channel
pub const GENERAL: &str = "100000000000000001";

/// Chat channel mapped to the world `ooc` channel
pub const OFF_TOPIC: &str = "100000000000000002";

/// Chat channel with no mapping
pub const UNMAPPED: &str = "100000000000000099";

/// World connection settings for a fake server on `port`
pub fn world_config(port: u16) -> WorldConfig {
    WorldConfig {
        name: "FakeMUD".to_string(),
        host: "127.0.0.1".to_string(),
        port,
        auth_token: None,
        retry_delay_ms: 50,
        retry_count: 3,
        infinite_retries: false,
        heartbeat_interval_ms: 60_000,
    }
}

/// `town` to #general and `ooc` to #off-topic
pub fn relay_settings() -> RelaySettings {
    RelaySettings {
        channels: vec![
            ChannelMapping::new("town", GENERAL),
            ChannelMapping::new("ooc", OFF_TOPIC),
        ],
        rate_limit_per_channel: 10,
        strip_emoji: true,
        max_message_length: 2000,
    }
}

/// A chat message from a human in `channel`
pub fn chat(author: &str, channel: &str, content: &str) -> ChatMessage {
    ChatMessage::new(author, channel, content)
}

/// A member that can be mentioned as `<@user_id>`
pub fn member(user_id: u64, display_name: &str) -> MentionedMember {
    MentionedMember {
        user_id,
        display_name: Some(display_name.to_string()),
        username: display_name.to_lowercase(),
    }
}

/// An inbound world frame as the server writes it
pub fn world_frame(channel: &str, name: &str, message: &str, emoted: i64) -> Value {
    json!({
        "channel": channel,
        "name": name,
        "message": message,
        "emoted": emoted,
    })
}
