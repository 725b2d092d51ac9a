//! `ChatGateway` over Discord HTTP

use async_trait::async_trait;
use relay_core::{ChannelInfo, ChatGateway, DomainError, GatewayResult};
use serenity::all::{Channel, ChannelId, Http};
use std::sync::Arc;

/// Sends messages and fetches channels through the Discord REST API
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway {
    async fn send(&self, channel_id: &str, text: &str) -> GatewayResult<()> {
        let id = parse_channel_id(channel_id)?;
        id.say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Gateway(e.to_string()))
    }

    async fn fetch_channel(&self, channel_id: &str) -> GatewayResult<ChannelInfo> {
        let id = parse_channel_id(channel_id)?;
        let channel = id
            .to_channel(&self.http)
            .await
            .map_err(|e| DomainError::Gateway(e.to_string()))?;

        match channel {
            Channel::Guild(channel) => {
                let guild_name = match channel.guild_id.to_partial_guild(&self.http).await {
                    Ok(guild) => Some(guild.name),
                    Err(e) => {
                        tracing::debug!(guild_id = %channel.guild_id, error = %e, "Guild lookup failed");
                        None
                    }
                };

                Ok(ChannelInfo {
                    id: channel.id.to_string(),
                    name: channel.name.clone(),
                    guild_id: Some(channel.guild_id.to_string()),
                    guild_name,
                })
            }
            Channel::Private(channel) => Ok(ChannelInfo {
                id: channel.id.to_string(),
                name: channel.name(),
                guild_id: None,
                guild_name: None,
            }),
            _ => Err(DomainError::ChannelNotFound(channel_id.to_string())),
        }
    }
}

impl std::fmt::Debug for DiscordGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordGateway").finish_non_exhaustive()
    }
}

/// Parse a configured channel id (a non-zero snowflake)
fn parse_channel_id(raw: &str) -> GatewayResult<ChannelId> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| DomainError::InvalidChannelId(raw.to_string()))
}
