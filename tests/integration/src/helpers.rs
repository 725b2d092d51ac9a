//! Test helpers for integration tests
//!
//! Provides a fake world server, a recording chat gateway, a running relay
//! and a health server bound to a free port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_bridge::{serve_health, HealthStats, Relay, RelayContext, RelayEvent};
use relay_common::{RelaySettings, WorldConfig};
use relay_core::{ChannelInfo, ChatGateway, ChatMessage, DomainError, GatewayResult};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Upper bound on any single wait in a test
pub const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Fake world server
// ============================================================================

/// Listener standing in for the world server
pub struct FakeWorld {
    listener: TcpListener,
}

impl FakeWorld {
    /// Bind to a free local port
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        Ok(Self { listener })
    }

    pub fn port(&self) -> u16 {
        self.listener.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    /// Wait for the relay to connect
    pub async fn accept(&self) -> Result<WorldConn> {
        let (stream, _) = timeout(WAIT, self.listener.accept())
            .await
            .context("relay did not connect")??;
        let (read, write) = stream.into_split();
        Ok(WorldConn {
            reader: BufReader::new(read),
            writer: write,
        })
    }
}

/// One accepted relay connection
pub struct WorldConn {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl WorldConn {
    /// Read the next frame written by the relay
    pub async fn read_frame(&mut self) -> Result<Value> {
        let mut line = String::new();
        let read = timeout(WAIT, self.reader.read_line(&mut line))
            .await
            .context("no frame from relay")??;
        anyhow::ensure!(read > 0, "relay closed the connection");
        Ok(serde_json::from_str(line.trim_end())?)
    }

    /// Read frames until one is not a heartbeat
    pub async fn read_chat_frame(&mut self) -> Result<Value> {
        loop {
            let frame = self.read_frame().await?;
            if frame["channel"] != "heartbeat" {
                return Ok(frame);
            }
        }
    }

    /// Whether the relay writes anything within `window`
    pub async fn is_quiet_for(&mut self, window: Duration) -> bool {
        let mut line = String::new();
        timeout(window, self.reader.read_line(&mut line)).await.is_err()
    }

    /// Write one JSON line
    pub async fn send_frame(&mut self, frame: &Value) -> Result<()> {
        let mut line = serde_json::to_string(frame)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Write raw bytes
    pub async fn send_raw(&mut self, raw: &[u8]) -> Result<()> {
        self.writer.write_all(raw).await?;
        Ok(())
    }
}

// ============================================================================
// Recording chat gateway
// ============================================================================

/// Chat gateway that records every send
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, String)>>,
    fetched: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Messages sent so far, as `(channel_id, text)`
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }

    /// Channel ids looked up so far
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }

    /// Wait until at least `count` messages were sent
    pub async fn wait_for_sent(&self, count: usize) -> Result<Vec<(String, String)>> {
        wait_until(|| self.sent.lock().len() >= count)
            .await
            .with_context(|| format!("expected {count} chat sends, got {:?}", self.sent()))?;
        Ok(self.sent())
    }
}

#[async_trait]
impl ChatGateway for RecordingGateway {
    async fn send(&self, channel_id: &str, text: &str) -> GatewayResult<()> {
        self.sent
            .lock()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn fetch_channel(&self, channel_id: &str) -> GatewayResult<ChannelInfo> {
        self.fetched.lock().push(channel_id.to_string());
        if channel_id.is_empty() {
            return Err(DomainError::ChannelNotFound(channel_id.to_string()));
        }
        Ok(ChannelInfo {
            id: channel_id.to_string(),
            name: "general".to_string(),
            guild_id: Some("1".to_string()),
            guild_name: Some("Test Guild".to_string()),
        })
    }
}

// ============================================================================
// Running relay
// ============================================================================

/// A relay dispatcher running in the background
pub struct TestRelay {
    pub stats: Arc<HealthStats>,
    pub gateway: Arc<RecordingGateway>,
    events: mpsc::Sender<RelayEvent>,
    handle: JoinHandle<()>,
}

impl TestRelay {
    /// Start a relay connecting with `world` and relaying per `settings`
    pub fn start(world: WorldConfig, settings: RelaySettings) -> Self {
        let stats = Arc::new(HealthStats::new());
        let gateway = RecordingGateway::new();
        let (events, rx) = mpsc::channel(64);

        let relay = Relay::new(RelayContext {
            world,
            settings,
            gateway: gateway.clone(),
            health: stats.clone(),
        });
        let handle = tokio::spawn(relay.run(rx));

        Self {
            stats,
            gateway,
            events,
            handle,
        }
    }

    /// Post a chat message event
    pub async fn chat(&self, message: ChatMessage) -> Result<()> {
        self.event(RelayEvent::ChatMessage(message)).await
    }

    /// Post any relay event
    pub async fn event(&self, event: RelayEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| anyhow::anyhow!("relay stopped"))
    }

    /// Wait until the world connection flag is `connected`
    pub async fn wait_world_connected(&self, connected: bool) -> Result<()> {
        wait_until(|| self.stats.snapshot().connections.mud == connected)
            .await
            .with_context(|| format!("world connected never became {connected}"))
    }

    /// Send `Shutdown` and wait for the dispatcher to exit
    pub async fn shutdown(self) -> Result<()> {
        self.event(RelayEvent::Shutdown).await?;
        timeout(WAIT, self.handle).await??;
        Ok(())
    }
}

// ============================================================================
// Health server
// ============================================================================

/// Health endpoint served on a free port
pub struct TestHealthServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestHealthServer {
    /// Serve `stats` on 127.0.0.1 with an OS-assigned port
    pub async fn start(stats: Arc<HealthStats>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve_health(listener, stats).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with an empty body
    pub async fn post(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Poll `check` until it holds or `WAIT` elapses
pub async fn wait_until<F>(mut check: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("condition not met in {WAIT:?}"))
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}
