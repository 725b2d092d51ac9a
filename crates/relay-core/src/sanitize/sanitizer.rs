//! Outbound text sanitizer
//!
//! Pipeline applied to chat text before it is written to the world server:
//!
//! 1. messages longer than the configured limit are dropped;
//! 2. emoji are stripped (when enabled) and `<@id>` mentions are replaced
//!    with member names, repeated until neither changes the text;
//! 3. `@everyone` / `@here` are replaced with a placeholder;
//! 4. an empty author name or empty text drops the message.
//!
//! Running the text pipeline on its own output returns the same text.

use super::EmojiRules;
use crate::entities::ChatMessage;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Replacement for `@everyone` and `@here`
pub const MENTION_PLACEHOLDER: &str = "[mention removed]";

/// Default maximum length (in UTF-16 units) of a relayed message
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 2000;

static MASS_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@(?:everyone|here)").unwrap());

static USER_MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@!?(\d+)>").unwrap());

/// Resolves a mentioned user id to the name shown in its place
pub trait MentionResolver {
    fn resolve_mention(&self, user_id: u64) -> Option<String>;
}

impl MentionResolver for ChatMessage {
    fn resolve_mention(&self, user_id: u64) -> Option<String> {
        self.mentioned(user_id).map(|m| m.shown_name().to_string())
    }
}

/// Resolver that knows no members
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMentions;

impl MentionResolver for NoMentions {
    fn resolve_mention(&self, _user_id: u64) -> Option<String> {
        None
    }
}

/// Sanitizer configuration
#[derive(Debug, Clone)]
pub struct SanitizerConfig {
    /// Strip custom and Unicode emoji from names and text
    pub strip_emoji: bool,
    /// Messages whose raw content is longer than this are dropped
    pub max_message_length: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            strip_emoji: true,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

/// Result of sanitizing a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizeOutcome {
    /// Safe to relay
    Relay { author: String, text: String },
    /// Raw content exceeded the length limit
    TooLong { length: usize, max: usize },
    /// Author name was empty after stripping
    EmptyAuthor,
    /// Text was empty after stripping
    EmptyText,
}

/// Pure text sanitizer with injected emoji rules
#[derive(Debug, Clone)]
pub struct Sanitizer {
    config: SanitizerConfig,
    rules: EmojiRules,
}

impl Sanitizer {
    /// Create a sanitizer
    #[must_use]
    pub fn new(config: SanitizerConfig, rules: EmojiRules) -> Self {
        Self { config, rules }
    }

    /// Get the configuration
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Sanitize a chat message into an author name and text for the world server
    pub fn sanitize_message(&self, message: &ChatMessage) -> SanitizeOutcome {
        let length = message.content.encode_utf16().count();
        if length > self.config.max_message_length {
            return SanitizeOutcome::TooLong {
                length,
                max: self.config.max_message_length,
            };
        }

        let author = self.clean_author(&message.author_name);
        if author.is_empty() {
            return SanitizeOutcome::EmptyAuthor;
        }

        let text = self.sanitize_text(&message.content, message);
        if text.is_empty() {
            return SanitizeOutcome::EmptyText;
        }

        SanitizeOutcome::Relay { author, text }
    }

    /// Run the text pipeline (everything except the length and emptiness checks)
    pub fn sanitize_text(&self, text: &str, resolver: &dyn MentionResolver) -> String {
        let mut current = text.to_string();

        // Each changing round removes a `<` (mention) or shortens the text
        // (emoji), so this terminates.
        loop {
            let stripped = self.strip(&current);
            let resolved = self.resolve_mentions(&stripped, resolver);
            if resolved == current {
                break;
            }
            current = resolved;
        }

        MASS_MENTION
            .replace_all(&current, MENTION_PLACEHOLDER)
            .trim()
            .to_string()
    }

    /// Clean an author name: emoji stripped (when enabled) and trimmed
    pub fn clean_author(&self, name: &str) -> String {
        self.strip(name).trim().to_string()
    }

    fn strip(&self, text: &str) -> String {
        if self.config.strip_emoji {
            self.rules.strip(text).into_owned()
        } else {
            text.to_string()
        }
    }

    fn resolve_mentions(&self, text: &str, resolver: &dyn MentionResolver) -> String {
        USER_MENTION
            .replace_all(text, |caps: &Captures<'_>| {
                let raw_id = &caps[1];
                match raw_id.parse::<u64>().ok().and_then(|id| resolver.resolve_mention(id)) {
                    Some(name) => self.clean_mention_name(&name),
                    None => format!("@{raw_id}"),
                }
            })
            .into_owned()
    }

    /// Names inserted into the text can never carry markup of their own
    fn clean_mention_name(&self, name: &str) -> String {
        self.strip(name).replace(['<', '>'], "")
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default(), EmojiRules::unicode())
    }
}
