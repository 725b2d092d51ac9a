//! Events posted by connection tasks to the dispatcher
//!
//! Every event carries the generation of the connection attempt that
//! produced it; the manager ignores events from earlier generations.

use std::io;
use tokio::net::TcpStream;

/// An event from a world connection task
#[derive(Debug)]
pub enum WorldEvent {
    /// A connect attempt succeeded
    Connected { generation: u64, stream: TcpStream },

    /// A connect attempt failed
    ConnectFailed { generation: u64, error: io::Error },

    /// One line of data arrived
    Line { generation: u64, line: String },

    /// The socket closed; `error` is set when it closed because of a failure
    Closed {
        generation: u64,
        error: Option<io::Error>,
    },

    /// The heartbeat interval elapsed
    HeartbeatTick { generation: u64 },

    /// The reconnect delay elapsed
    ReconnectDue { generation: u64 },
}

impl WorldEvent {
    /// Generation the event belongs to
    pub fn generation(&self) -> u64 {
        match self {
            Self::Connected { generation, .. }
            | Self::ConnectFailed { generation, .. }
            | Self::Line { generation, .. }
            | Self::Closed { generation, .. }
            | Self::HeartbeatTick { generation }
            | Self::ReconnectDue { generation } => *generation,
        }
    }

    /// Short event name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::ConnectFailed { .. } => "connect_failed",
            Self::Line { .. } => "line",
            Self::Closed { .. } => "closed",
            Self::HeartbeatTick { .. } => "heartbeat_tick",
            Self::ReconnectDue { .. } => "reconnect_due",
        }
    }
}
