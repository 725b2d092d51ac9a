//! # relay-world
//!
//! Client side of the world server (MUD) connection: the newline-delimited
//! JSON frame protocol and the connection manager that owns the socket,
//! the reconnect policy, and the heartbeat timer.

pub mod connection;
pub mod error;
pub mod protocol;

pub use connection::{ConnectionManager, ConnectionState, RetryDecision, RetryPolicy, WorldEvent};
pub use error::{WorldError, WorldResult};
pub use protocol::{InboundWorldFrame, OutboundWorldFrame};
