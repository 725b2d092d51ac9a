//! Process wiring
//!
//! Starts the health endpoint, the relay dispatcher and the Discord client,
//! then waits for SIGINT/SIGTERM.

mod health;

pub use health::{
    health_router, serve_health, ConnectionFlags, HealthSnapshot, HealthStats, MessageCounters,
};

use crate::discord::{DiscordGateway, DiscordHandler, INTENTS};
use crate::relay::{Relay, RelayContext, RelayEvent};
use relay_common::{AppConfig, AppError, AppResult};
use serenity::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Buffer size of the relay event queue
const RELAY_EVENT_BUFFER: usize = 256;

/// Run the relay until a shutdown signal arrives
pub async fn run(config: AppConfig) -> AppResult<()> {
    let stats = Arc::new(HealthStats::new());

    // Health endpoint
    let addr = config.health.address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::HealthServer(format!("Failed to bind to {addr}: {e}")))?;
    let health_task = tokio::spawn(serve_health(listener, Arc::clone(&stats)));

    // Discord client
    let (events_tx, events_rx) = mpsc::channel(RELAY_EVENT_BUFFER);
    let mut client = Client::builder(&config.chat.token, INTENTS)
        .event_handler(DiscordHandler::new(events_tx.clone()))
        .await
        .map_err(|e| AppError::ChatGateway(e.to_string()))?;

    // Relay dispatcher
    let relay = Relay::new(RelayContext {
        world: config.world,
        settings: config.relay,
        gateway: Arc::new(DiscordGateway::new(Arc::clone(&client.http))),
        health: stats,
    });
    let relay_task = tokio::spawn(relay.run(events_rx));

    // Shutdown on ctrl-c or SIGTERM
    let shard_manager = Arc::clone(&client.shard_manager);
    let shutdown_tx = events_tx.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(RelayEvent::Shutdown).await;
        shard_manager.shutdown_all().await;
    });

    info!("Logging into Discord...");
    let result = client.start().await;

    // Reached after shutdown_all, or when login fails
    let _ = events_tx.send(RelayEvent::Shutdown).await;
    let relay_result = relay_task.await;
    health_task.abort();

    result.map_err(|e| AppError::ChatGateway(e.to_string()))?;
    relay_result.map_err(|e| AppError::Internal(e.into()))?;
    info!("Relay stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("SIGINT received, closing connections..."),
                    _ = sigterm.recv() => info!("SIGTERM received, closing connections..."),
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                info!("SIGINT received, closing connections...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("SIGINT received, closing connections...");
    }
}
