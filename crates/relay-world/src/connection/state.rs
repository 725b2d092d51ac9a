//! Connection state and reconnect policy

use relay_common::WorldConfig;
use serde::{Deserialize, Serialize};

/// World connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No socket and no attempt in progress
    Disconnected,
    /// A connect attempt is in flight
    Connecting,
    /// Socket open; heartbeat running
    Connected,
    /// Socket failed; waiting for the reconnect delay
    Retrying,
}

impl ConnectionState {
    /// Whether a socket is open or being opened
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Retrying => "retrying",
        };
        f.write_str(name)
    }
}

/// What to do after a socket error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Reconnect after the delay; `attempt` is the consecutive error count
    Retry { attempt: u32, max: Option<u32> },
    /// Maximum reached; stop reconnecting
    GiveUp { attempts: u32 },
}

/// Reconnect policy applied on socket errors
///
/// Clean closes do not go through the policy: they always reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive errors after which reconnecting stops
    pub max_retries: u32,
    /// Ignore `max_retries` and reconnect forever
    pub infinite: bool,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, infinite: bool) -> Self {
        Self {
            max_retries,
            infinite,
        }
    }

    /// Count an error and decide whether to reconnect
    ///
    /// Giving up resets the counter to zero.
    pub fn on_error(&self, retries: &mut u32) -> RetryDecision {
        *retries = retries.saturating_add(1);

        if self.infinite {
            return RetryDecision::Retry {
                attempt: *retries,
                max: None,
            };
        }

        if *retries >= self.max_retries {
            let attempts = *retries;
            *retries = 0;
            return RetryDecision::GiveUp { attempts };
        }

        RetryDecision::Retry {
            attempt: *retries,
            max: Some(self.max_retries),
        }
    }
}

impl From<&WorldConfig> for RetryPolicy {
    fn from(config: &WorldConfig) -> Self {
        Self::new(config.retry_count, config.infinite_retries)
    }
}
