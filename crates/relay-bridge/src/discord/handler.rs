//! Serenity event handler

use crate::relay::RelayEvent;
use relay_core::{ChatMessage, MentionedMember};
use serenity::all::{Context, EventHandler, GatewayIntents, Message, Ready, ResumedEvent, User};
use serenity::async_trait;
use tokio::sync::mpsc;

/// Gateway intents the relay needs: guild channels, message content, and
/// member data for nicknames
pub const INTENTS: GatewayIntents = GatewayIntents::GUILDS
    .union(GatewayIntents::GUILD_MESSAGES)
    .union(GatewayIntents::MESSAGE_CONTENT)
    .union(GatewayIntents::GUILD_MEMBERS);

/// Forwards gateway events to the relay dispatcher
pub struct DiscordHandler {
    events: mpsc::Sender<RelayEvent>,
}

impl DiscordHandler {
    pub fn new(events: mpsc::Sender<RelayEvent>) -> Self {
        Self { events }
    }

    async fn forward(&self, event: RelayEvent) {
        let kind = event.kind();
        if self.events.send(event).await.is_err() {
            tracing::debug!(kind = kind, "Relay stopped, dropping chat event");
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.forward(RelayEvent::ChatReady {
            user: ready.user.tag(),
        })
        .await;
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        tracing::info!("Discord session resumed");
        self.forward(RelayEvent::ChatResumed).await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        // Direct messages are never mapped
        if msg.guild_id.is_none() {
            return;
        }

        self.forward(RelayEvent::ChatMessage(chat_message_from(&msg)))
            .await;
    }
}

/// Convert a serenity message into the relay's chat message
pub fn chat_message_from(msg: &Message) -> ChatMessage {
    let author_name = msg
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .filter(|nick| !nick.is_empty())
        .unwrap_or_else(|| msg.author.name.clone());

    ChatMessage {
        author_name,
        author_is_bot: msg.author.bot,
        channel_id: msg.channel_id.get().to_string(),
        content: msg.content.clone(),
        mentions: msg.mentions.iter().map(mentioned_member).collect(),
    }
}

fn mentioned_member(user: &User) -> MentionedMember {
    let display_name = user
        .member
        .as_ref()
        .and_then(|member| member.nick.clone())
        .or_else(|| user.global_name.clone());

    MentionedMember {
        user_id: user.id.get(),
        display_name,
        username: user.name.clone(),
    }
}
