//! Emoji matching rules

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Custom platform emoji: `<:name:id>` / `<a:name:id>` with an 18-digit id.
/// The angle brackets are optional so bare `:name:id` fragments go too.
const CUSTOM_EMOJI_PATTERN: &str = r"<?a?:\w+:\d{18}>?";

/// Standard pictographic emoji, including keycaps, flags, skin tone
/// modifiers, tag sequences and ZWJ sequences.
const UNICODE_EMOJI_PATTERN: &str = concat!(
    r"[0-9#*]\x{FE0F}?\x{20E3}",
    r"|[\x{1F1E6}-\x{1F1FF}]",
    r"|\p{Extended_Pictographic}(?:\x{FE0F}|\p{Emoji_Modifier}|[\x{E0020}-\x{E007F}])*",
    r"(?:\x{200D}\p{Extended_Pictographic}(?:\x{FE0F}|\p{Emoji_Modifier})*)*",
    r"|\p{Emoji_Modifier}",
);

static DEFAULT_RULES: LazyLock<EmojiRules> = LazyLock::new(|| {
    EmojiRules::new(CUSTOM_EMOJI_PATTERN, UNICODE_EMOJI_PATTERN)
        .unwrap_or_else(|e| panic!("built-in emoji patterns must compile: {e}"))
});

/// A swappable pair of emoji patterns used by the sanitizer
#[derive(Debug, Clone)]
pub struct EmojiRules {
    custom: Regex,
    pictographic: Regex,
}

impl EmojiRules {
    /// Build rules from a custom-emoji pattern and a pictographic pattern
    pub fn new(custom: &str, pictographic: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            custom: Regex::new(custom)?,
            pictographic: Regex::new(pictographic)?,
        })
    }

    /// Built-in rules covering platform custom emoji and Unicode emoji
    #[must_use]
    pub fn unicode() -> Self {
        DEFAULT_RULES.clone()
    }

    /// Remove custom emoji, then pictographic emoji
    ///
    /// Repeats until nothing matches, so a removal can never leave a new
    /// match behind (e.g. a keycap digit followed by U+20E3).
    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);
        loop {
            let without_custom = self.custom.replace_all(&current, "");
            let stripped = self.pictographic.replace_all(&without_custom, "").into_owned();
            if stripped.len() == current.len() {
                return current;
            }
            current = Cow::Owned(stripped);
        }
    }
}

impl Default for EmojiRules {
    fn default() -> Self {
        Self::unicode()
    }
}
