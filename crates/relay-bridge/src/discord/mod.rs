//! Discord adapter
//!
//! [`DiscordHandler`] turns serenity gateway events into [`RelayEvent`]s and
//! [`DiscordGateway`] implements the relay's `ChatGateway` over Discord HTTP.
//!
//! [`RelayEvent`]: crate::relay::RelayEvent

mod gateway;
mod handler;

pub use gateway::DiscordGateway;
pub use handler::{chat_message_from, DiscordHandler, INTENTS};
