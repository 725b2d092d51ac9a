//! Chat message entity - a message created on the chat platform

use serde::{Deserialize, Serialize};

/// A member referenced by a user mention inside a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionedMember {
    /// Platform user id (the number inside `<@...>`)
    pub user_id: u64,
    /// Guild display name (nickname or global name), if known
    pub display_name: Option<String>,
    /// Account username
    pub username: String,
}

impl MentionedMember {
    /// The name shown in place of the mention: display name, else username
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

/// A message-create event from the chat gateway
///
/// Carries everything the relay needs from the platform event: author
/// identity, the bot flag, the channel, raw content, and the members the
/// content mentions so mentions can be resolved without further I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author's guild nickname, falling back to the account username
    pub author_name: String,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Chat channel the message was posted in
    pub channel_id: String,
    /// Raw message content
    pub content: String,
    /// Members referenced by `<@id>` tokens in the content
    #[serde(default)]
    pub mentions: Vec<MentionedMember>,
}

impl ChatMessage {
    /// Create a message from a human author with no mentions
    #[must_use]
    pub fn new(
        author_name: impl Into<String>,
        channel_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            author_name: author_name.into(),
            author_is_bot: false,
            channel_id: channel_id.into(),
            content: content.into(),
            mentions: Vec::new(),
        }
    }

    /// Mark the author as a bot
    #[must_use]
    pub fn from_bot(mut self) -> Self {
        self.author_is_bot = true;
        self
    }

    /// Attach a mentioned member
    #[must_use]
    pub fn with_mention(mut self, member: MentionedMember) -> Self {
        self.mentions.push(member);
        self
    }

    /// Look up a mentioned member by user id
    pub fn mentioned(&self, user_id: u64) -> Option<&MentionedMember> {
        self.mentions.iter().find(|m| m.user_id == user_id)
    }
}
