//! # relay-bridge
//!
//! Relays chat between a world server (MUD) and Discord channels.
//!
//! - [`relay`]: the dispatcher loop that owns the world connection, the rate
//!   limiter and the sanitizer
//! - [`discord`]: serenity event handler and the `ChatGateway` adapter
//! - [`server`]: process wiring and the `/health` endpoint

pub mod discord;
pub mod relay;
pub mod server;

pub use relay::{ChatDisposition, Relay, RelayContext, RelayEvent};
pub use server::{health_router, run, serve_health, HealthSnapshot, HealthStats};
