//! Outbound text sanitizing
//!
//! Makes chat text safe to print on the world server: mass mentions are
//! neutralized, user mentions become names, and emoji are stripped.

mod emoji;
mod sanitizer;

pub use emoji::EmojiRules;
pub use sanitizer::{
    MentionResolver, NoMentions, SanitizeOutcome, Sanitizer, SanitizerConfig,
    DEFAULT_MAX_MESSAGE_LENGTH, MENTION_PLACEHOLDER,
};
