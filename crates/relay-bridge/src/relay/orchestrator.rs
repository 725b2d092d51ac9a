//! Relay dispatcher
//!
//! Chat to world: sanitize, route, rate limit, write a frame.
//! World to chat: route, format, queue on the outbox.

use super::{Outbox, RelayEvent};
use relay_common::{RelaySettings, WorldConfig};
use relay_core::{
    ChannelRouter, ChatGateway, ChatMessage, EmojiRules, HealthSink, RateLimitKey, RateLimiter,
    RateLimiterConfig, SanitizeOutcome, Sanitizer, SanitizerConfig,
};
use relay_world::{ConnectionManager, InboundWorldFrame, OutboundWorldFrame, WorldEvent};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Everything the relay is built from
pub struct RelayContext {
    pub world: WorldConfig,
    pub settings: RelaySettings,
    pub gateway: Arc<dyn ChatGateway>,
    pub health: Arc<dyn HealthSink>,
}

/// What happened to a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatDisposition {
    /// Written to the world server
    Relayed,
    /// Posted by a bot
    FromBot,
    /// No content at all
    EmptyContent,
    /// Dropped by the sanitizer
    Rejected(SanitizeOutcome),
    /// Channel has no world mapping
    Unmapped,
    /// Author is sending too fast in this channel
    RateLimited,
    /// World server is not connected or the write failed
    NotDelivered,
}

/// The relay engine; owned by a single dispatcher task
pub struct Relay {
    router: ChannelRouter,
    limiter: RateLimiter,
    sanitizer: Sanitizer,
    world: ConnectionManager,
    world_events: mpsc::Receiver<WorldEvent>,
    outbox: Outbox,
    gateway: Arc<dyn ChatGateway>,
    health: Arc<dyn HealthSink>,
}

impl Relay {
    /// Build the relay; nothing connects until [`Relay::run`]
    pub fn new(ctx: RelayContext) -> Self {
        let RelayContext {
            world,
            settings,
            gateway,
            health,
        } = ctx;

        let sanitizer = Sanitizer::new(
            SanitizerConfig {
                strip_emoji: settings.strip_emoji,
                max_message_length: settings.max_message_length,
            },
            EmojiRules::unicode(),
        );
        let limiter = RateLimiter::new(RateLimiterConfig::per_second(
            settings.rate_limit_per_channel,
        ));
        let (world, world_events) = ConnectionManager::new(world, Arc::clone(&health));
        let outbox = Outbox::spawn(Arc::clone(&gateway), Arc::clone(&health));

        Self {
            router: ChannelRouter::new(settings.channels),
            limiter,
            sanitizer,
            world,
            world_events,
            outbox,
            gateway,
            health,
        }
    }

    /// Get the world connection
    pub fn world(&self) -> &ConnectionManager {
        &self.world
    }

    /// Get the channel router
    pub fn router(&self) -> &ChannelRouter {
        &self.router
    }

    /// Connect to the world server and dispatch events until shutdown
    pub async fn run(mut self, mut events: mpsc::Receiver<RelayEvent>) {
        tracing::info!(channels = self.router.len(), "Relay started");
        self.world.connect();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(RelayEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event).await,
                },
                Some(event) = self.world_events.recv() => {
                    self.handle_world_event(event).await;
                }
            }
        }

        self.shutdown();
    }

    /// Handle an event from the chat side
    pub async fn handle_event(&mut self, event: RelayEvent) {
        tracing::trace!(kind = event.kind(), "Relay event");

        match event {
            RelayEvent::ChatReady { user } => {
                tracing::info!(user = %user, "Logged into chat");
                self.health.set_chat_connected(true);
                self.lookup_channels();
            }
            RelayEvent::ChatResumed => {
                self.health.set_chat_connected(true);
            }
            RelayEvent::ChatMessage(message) => {
                let disposition = self.handle_chat_message(&message).await;
                tracing::trace!(
                    channel_id = %message.channel_id,
                    disposition = ?disposition,
                    "Chat message handled"
                );
            }
            RelayEvent::Shutdown => self.shutdown(),
        }
    }

    /// Handle an event from the world connection
    pub async fn handle_world_event(&mut self, event: WorldEvent) {
        if let Some(frame) = self.world.handle_event(event).await {
            self.relay_world_frame(&frame);
        }
    }

    /// Relay a chat message to the world server
    pub async fn handle_chat_message(&mut self, message: &ChatMessage) -> ChatDisposition {
        if message.author_is_bot {
            return ChatDisposition::FromBot;
        }
        if message.content.is_empty() {
            return ChatDisposition::EmptyContent;
        }

        let (author, text) = match self.sanitizer.sanitize_message(message) {
            SanitizeOutcome::Relay { author, text } => (author, text),
            outcome => {
                tracing::debug!(
                    channel_id = %message.channel_id,
                    outcome = ?outcome,
                    "Chat message dropped by sanitizer"
                );
                return ChatDisposition::Rejected(outcome);
            }
        };

        let Some(world_channel) = self.router.chat_to_world(&message.channel_id) else {
            return ChatDisposition::Unmapped;
        };
        let world_channel = world_channel.to_string();

        let key = RateLimitKey::new(world_channel.as_str(), author.as_str());
        if !self.limiter.allow(&key, Instant::now()) {
            return ChatDisposition::RateLimited;
        }

        let frame = OutboundWorldFrame::new(world_channel, author, text);
        match self.world.send(&frame).await {
            Ok(()) => {
                self.health.increment_chat_to_world();
                ChatDisposition::Relayed
            }
            Err(e) => {
                tracing::debug!(channel = %frame.channel, error = %e, "Chat message not delivered");
                ChatDisposition::NotDelivered
            }
        }
    }

    /// Queue a world frame for its mapped chat channel; false when unmapped
    pub fn relay_world_frame(&self, frame: &InboundWorldFrame) -> bool {
        let Some(chat_channel) = self.router.world_to_chat(&frame.channel) else {
            tracing::trace!(channel = %frame.channel, "No chat channel for world channel");
            return false;
        };

        self.outbox.push(chat_channel, frame.display_text())
    }

    /// Log every mapped chat channel, off the dispatcher
    fn lookup_channels(&self) {
        let gateway = Arc::clone(&self.gateway);
        let channels: Vec<String> = self
            .router
            .chat_channels()
            .into_iter()
            .map(String::from)
            .collect();

        tokio::spawn(async move {
            for channel_id in channels {
                match gateway.fetch_channel(&channel_id).await {
                    Ok(info) => tracing::info!(
                        channel = %info.name,
                        channel_id = %info.id,
                        guild = info.guild_name.as_deref().unwrap_or("-"),
                        guild_id = info.guild_id.as_deref().unwrap_or("-"),
                        "Found chat channel"
                    ),
                    Err(e) if e.is_not_found() => tracing::warn!(
                        channel_id = %channel_id,
                        error = %e,
                        "Mapped chat channel not available"
                    ),
                    Err(e) => tracing::error!(
                        channel_id = %channel_id,
                        error = %e,
                        "Chat channel lookup failed"
                    ),
                }
            }
        });
    }

    fn shutdown(&mut self) {
        tracing::info!("Relay shutting down");
        self.world.shutdown();
        self.outbox.abort();
        self.health.set_chat_connected(false);
    }
}
