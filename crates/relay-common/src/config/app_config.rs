//! Application configuration structs
//!
//! Loads the relay configuration from a config file (the flat `config.json`
//! layout: `mud_ip`, `mud_port`, `channels`, ...) layered with environment
//! variables. Secrets come from the environment: `DISCORD_TOKEN` and
//! `MUD_AUTH_TOKEN`. Any file key may be overridden as `RELAY_<KEY>`.

use relay_core::ChannelMapping;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Config file used when `RELAY_CONFIG` is not set (extension auto-detected)
pub const DEFAULT_CONFIG_PATH: &str = "config/config";

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub chat: ChatConfig,
    pub world: WorldConfig,
    pub relay: RelaySettings,
    pub health: ServerConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Read `APP_ENV` (after loading `.env`), defaulting to development
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        env::var("APP_ENV")
            .ok()
            .and_then(|s| Self::parse(&s))
            .unwrap_or_default()
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Chat platform (Discord) settings
#[derive(Clone)]
pub struct ChatConfig {
    /// Bot token
    pub token: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("token", &"[redacted]")
            .finish()
    }
}

/// World server connection settings
#[derive(Clone)]
pub struct WorldConfig {
    /// Display name used in logs
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Pre-shared token sent in the `auth` frame; `None` sends no auth frame
    pub auth_token: Option<String>,
    /// Delay before every reconnect attempt
    pub retry_delay_ms: u64,
    /// Consecutive errors after which reconnecting stops
    pub retry_count: u32,
    /// Reconnect after errors forever, ignoring `retry_count`
    pub infinite_retries: bool,
    /// Interval between heartbeat frames
    pub heartbeat_interval_ms: u64,
}

impl WorldConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl std::fmt::Debug for WorldConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldConfig")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[redacted]"))
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("retry_count", &self.retry_count)
            .field("infinite_retries", &self.infinite_retries)
            .field("heartbeat_interval_ms", &self.heartbeat_interval_ms)
            .finish()
    }
}

/// Relay behaviour settings
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Ordered channel mappings; first match wins
    pub channels: Vec<ChannelMapping>,
    /// Messages per second per author and channel
    pub rate_limit_per_channel: u32,
    /// Strip emoji from chat names and text
    pub strip_emoji: bool,
    /// Chat messages longer than this are not relayed
    pub max_message_length: usize,
}

/// HTTP server configuration (health endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Flat file layout, as written in `config.json`
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_world_name")]
    pub mud_name: String,
    #[serde(default = "default_world_host")]
    pub mud_ip: String,
    pub mud_port: Option<u16>,
    #[serde(default)]
    pub mud_auth_token: Option<String>,
    #[serde(default = "default_retry_delay")]
    pub mud_retry_delay: u64,
    #[serde(default = "default_retry_count")]
    pub mud_retry_count: u32,
    #[serde(default)]
    pub mud_infinite_retries: bool,
    #[serde(default = "default_heartbeat_interval")]
    pub mud_heartbeat_interval: u64,
    #[serde(default)]
    pub channels: Vec<ChannelMapping>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_channel: u32,
    #[serde(default = "default_strip_emoji")]
    pub strip_emoji: bool,
    #[serde(default = "default_max_message_length")]
    pub largest_printable_string: usize,
    #[serde(default = "default_host")]
    pub health_host: String,
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

// Default value functions
fn default_app_name() -> String {
    "mud-relay".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_world_name() -> String {
    "MUD".to_string()
}

fn default_world_host() -> String {
    "127.0.0.1".to_string()
}

fn default_retry_delay() -> u64 {
    5_000
}

fn default_retry_count() -> u32 {
    10
}

fn default_heartbeat_interval() -> u64 {
    240_000 // 4 minutes
}

fn default_rate_limit() -> u32 {
    relay_core::ratelimit::DEFAULT_MESSAGES_PER_SECOND
}

fn default_strip_emoji() -> bool {
    true
}

fn default_max_message_length() -> usize {
    relay_core::sanitize::DEFAULT_MAX_MESSAGE_LENGTH
}

fn default_health_port() -> u16 {
    3000
}

impl AppConfig {
    /// Load configuration from the config file and the environment
    ///
    /// The file path comes from `RELAY_CONFIG` (default `config/config`,
    /// any format the `config` crate detects); a missing file is allowed so
    /// a deployment can be configured from the environment alone.
    ///
    /// # Errors
    /// Returns an error if the sources cannot be read or required values are missing
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let path = env::var("RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("RELAY").try_parsing(true))
            .build()?;

        Self::from_settings(settings, |key| env::var(key).ok())
    }

    /// Build the configuration from loaded settings and an environment lookup
    pub fn from_settings<F>(settings: config::Config, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let file: FileConfig = settings.try_deserialize()?;
        Self::from_file(file, lookup)
    }

    /// Build the configuration from the file layout and an environment lookup
    pub fn from_file<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let port = file.mud_port.ok_or(ConfigError::MissingVar("mud_port"))?;

        if file.channels.is_empty() {
            return Err(ConfigError::InvalidValue(
                "channels",
                "at least one channel mapping is required".to_string(),
            ));
        }

        // Zero means "not set"
        let rate_limit_per_channel = match file.rate_limit_per_channel {
            0 => default_rate_limit(),
            n => n,
        };

        let auth_token = lookup("MUD_AUTH_TOKEN")
            .or(file.mud_auth_token)
            .filter(|t| !t.is_empty());

        let health_port = match lookup("HEALTH_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HEALTH_PORT", raw))?,
            None => file.health_port,
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or(file.app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            chat: ChatConfig { token },
            world: WorldConfig {
                name: file.mud_name,
                host: file.mud_ip,
                port,
                auth_token,
                retry_delay_ms: file.mud_retry_delay,
                retry_count: file.mud_retry_count,
                infinite_retries: file.mud_infinite_retries,
                heartbeat_interval_ms: file.mud_heartbeat_interval,
            },
            relay: RelaySettings {
                channels: file.channels,
                rate_limit_per_channel,
                strip_emoji: file.strip_emoji,
                max_message_length: file.largest_printable_string,
            },
            health: ServerConfig {
                host: file.health_host,
                port: health_port,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}
