//! Minimum-interval rate limiter
//!
//! Each `(world channel, author)` pair may send at most one message per
//! `1s / messages_per_second`. Rejected messages are discarded, never queued.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default messages per second for one author in one channel
pub const DEFAULT_MESSAGES_PER_SECOND: u32 = 10;

/// Tracked keys above which stale entries are evicted
const CLEANUP_THRESHOLD: usize = 100;

/// Entries older than this are evicted during cleanup
const ENTRY_TTL: Duration = Duration::from_secs(10);

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Messages per second allowed per key
    pub messages_per_second: u32,
    /// Tracked keys above which cleanup runs
    pub cleanup_threshold: usize,
    /// Age after which an entry is evicted
    pub entry_ttl: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            messages_per_second: DEFAULT_MESSAGES_PER_SECOND,
            cleanup_threshold: CLEANUP_THRESHOLD,
            entry_ttl: ENTRY_TTL,
        }
    }
}

impl RateLimiterConfig {
    /// Configuration with a custom per-second limit and the default cleanup policy
    #[must_use]
    pub fn per_second(messages_per_second: u32) -> Self {
        Self {
            messages_per_second,
            ..Self::default()
        }
    }

    /// Minimum spacing between two accepted messages for the same key
    ///
    /// A limit of zero is treated as one message per second.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(1) / self.messages_per_second.max(1)
    }
}

/// Rate limit key: destination world channel plus author name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    pub world_channel: String,
    pub author: String,
}

impl RateLimitKey {
    /// Create a key
    #[must_use]
    pub fn new(world_channel: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            world_channel: world_channel.into(),
            author: author.into(),
        }
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.world_channel, self.author)
    }
}

/// Per-key minimum-interval throttle with lazy eviction
///
/// Owned by the relay dispatcher; it is never shared between tasks.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    interval: Duration,
    last_seen: HashMap<RateLimitKey, Instant>,
}

impl RateLimiter {
    /// Create a rate limiter
    #[must_use]
    pub fn new(config: RateLimiterConfig) -> Self {
        let interval = config.interval();
        Self {
            config,
            interval,
            last_seen: HashMap::new(),
        }
    }

    /// Check whether a message for `key` may pass at `now`
    ///
    /// Accepting a message records `now` for the key. A rejection leaves the
    /// previous timestamp in place.
    pub fn allow(&mut self, key: &RateLimitKey, now: Instant) -> bool {
        if let Some(last) = self.last_seen.get(key) {
            if now.saturating_duration_since(*last) < self.interval {
                tracing::debug!(key = %key, "Rate limit exceeded");
                return false;
            }
        }

        self.last_seen.insert(key.clone(), now);

        if self.last_seen.len() > self.config.cleanup_threshold {
            self.evict_stale(now);
        }

        true
    }

    /// Evict every entry older than the TTL relative to `now`
    fn evict_stale(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.config.entry_ttl) else {
            return;
        };

        let before = self.last_seen.len();
        self.last_seen.retain(|_, seen| *seen >= cutoff);

        tracing::trace!(
            evicted = before - self.last_seen.len(),
            remaining = self.last_seen.len(),
            "Rate limiter cleanup"
        );
    }

    /// Minimum spacing between accepted messages
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of tracked keys
    pub fn tracked(&self) -> usize {
        self.last_seen.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
