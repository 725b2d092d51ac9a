//! Domain entities - the objects the relay moves between the two sides

mod channel_mapping;
mod chat_message;

pub use channel_mapping::ChannelMapping;
pub use chat_message::{ChatMessage, MentionedMember};
