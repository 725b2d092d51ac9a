//! Per-author rate limiting for chat-to-world traffic

mod limiter;

pub use limiter::{RateLimitKey, RateLimiter, RateLimiterConfig, DEFAULT_MESSAGES_PER_SECOND};
