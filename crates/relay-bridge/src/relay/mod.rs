//! Relay engine
//!
//! One dispatcher task owns every piece of mutable relay state. Discord
//! events arrive as [`RelayEvent`]s, world connection events come from the
//! connection manager's own queue, and outbound Discord sends are handed to
//! the [`outbox`] task.

mod events;
mod orchestrator;
pub mod outbox;

pub use events::RelayEvent;
pub use orchestrator::{ChatDisposition, Relay, RelayContext};
pub use outbox::{Outbox, OutboxItem};
