//! Health endpoint
//!
//! `GET /health` reports both connection flags and the relayed message
//! counters. 200 when the world server and Discord are both connected,
//! otherwise 503. Every other path is 404.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use relay_common::{AppError, AppResult};
use relay_core::HealthSink;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Connection flags and message counters shared with the relay
#[derive(Debug)]
pub struct HealthStats {
    started: Instant,
    world_connected: AtomicBool,
    chat_connected: AtomicBool,
    world_to_chat: AtomicU64,
    chat_to_world: AtomicU64,
}

impl HealthStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            world_connected: AtomicBool::new(false),
            chat_connected: AtomicBool::new(false),
            world_to_chat: AtomicU64::new(0),
            chat_to_world: AtomicU64::new(0),
        }
    }

    /// Both sides connected
    pub fn is_healthy(&self) -> bool {
        self.world_connected.load(Ordering::Relaxed) && self.chat_connected.load(Ordering::Relaxed)
    }

    /// Point-in-time view served by the endpoint
    pub fn snapshot(&self) -> HealthSnapshot {
        let healthy = self.is_healthy();

        HealthSnapshot {
            status: if healthy { "healthy" } else { "unhealthy" },
            timestamp: Utc::now(),
            uptime: self.started.elapsed().as_secs(),
            connections: ConnectionFlags {
                mud: self.world_connected.load(Ordering::Relaxed),
                discord: self.chat_connected.load(Ordering::Relaxed),
            },
            messages: MessageCounters {
                mud_to_discord: self.world_to_chat.load(Ordering::Relaxed),
                discord_to_mud: self.chat_to_world.load(Ordering::Relaxed),
            },
        }
    }
}

impl Default for HealthStats {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthSink for HealthStats {
    fn set_world_connected(&self, connected: bool) {
        self.world_connected.store(connected, Ordering::Relaxed);
    }

    fn set_chat_connected(&self, connected: bool) {
        self.chat_connected.store(connected, Ordering::Relaxed);
    }

    fn increment_world_to_chat(&self) {
        self.world_to_chat.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_chat_to_world(&self) {
        self.chat_to_world.fetch_add(1, Ordering::Relaxed);
    }
}

/// Health response body
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the process started
    pub uptime: u64,
    pub connections: ConnectionFlags,
    pub messages: MessageCounters,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConnectionFlags {
    pub mud: bool,
    pub discord: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCounters {
    pub mud_to_discord: u64,
    pub discord_to_mud: u64,
}

/// Build the health router
pub fn health_router(stats: Arc<HealthStats>) -> Router {
    Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(stats)
}

/// GET /health
async fn health_check(State(stats): State<Arc<HealthStats>>) -> (StatusCode, Json<HealthSnapshot>) {
    let snapshot = stats.snapshot();
    let status = if stats.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(snapshot))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Serve the health router until the task is dropped
pub async fn serve_health(listener: TcpListener, stats: Arc<HealthStats>) -> AppResult<()> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::HealthServer(e.to_string()))?;
    tracing::info!("Health check endpoint available at http://{}/health", addr);

    axum::serve(listener, health_router(stats))
        .await
        .map_err(|e| AppError::HealthServer(format!("Server error: {e}")))
}
