//! Connection management
//!
//! Owns the single world server socket, its reconnect policy, and the
//! heartbeat timer.

mod events;
mod manager;
mod state;

pub use events::WorldEvent;
pub use manager::ConnectionManager;
pub use state::{ConnectionState, RetryDecision, RetryPolicy};
