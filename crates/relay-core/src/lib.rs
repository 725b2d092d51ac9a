//! # relay-core
//!
//! Domain layer of the relay: channel mappings, the chat message entity,
//! the channel router, the per-author rate limiter, the outbound text
//! sanitizer, and the collaborator traits the relay engine talks through.
//! This crate has no dependencies on sockets, runtimes, or the chat platform SDK.

pub mod entities;
pub mod error;
pub mod ratelimit;
pub mod routing;
pub mod sanitize;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{ChannelMapping, ChatMessage, MentionedMember};
pub use error::DomainError;
pub use ratelimit::{RateLimitKey, RateLimiter, RateLimiterConfig};
pub use routing::ChannelRouter;
pub use sanitize::{EmojiRules, MentionResolver, SanitizeOutcome, Sanitizer, SanitizerConfig};
pub use traits::{ChannelInfo, ChatGateway, GatewayResult, HealthSink, NoopHealth};
