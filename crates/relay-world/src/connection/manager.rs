//! World connection manager
//!
//! Owns the world server socket and drives its state machine. The manager is
//! owned by a single dispatcher: socket reads, connect attempts, heartbeat
//! ticks and reconnect timers run as tasks that only post [`WorldEvent`]s,
//! and the dispatcher feeds them back through [`ConnectionManager::handle_event`].
//! Nothing here needs a lock.

use super::{ConnectionState, RetryDecision, RetryPolicy, WorldEvent};
use crate::error::{WorldError, WorldResult};
use crate::protocol::{InboundWorldFrame, OutboundWorldFrame};
use relay_common::WorldConfig;
use relay_core::HealthSink;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Channel buffer size for connection events
const EVENT_BUFFER_SIZE: usize = 256;

/// Lower bound for the heartbeat interval
const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10);

/// Manages the connection to the world server
pub struct ConnectionManager {
    config: WorldConfig,
    policy: RetryPolicy,
    health: Arc<dyn HealthSink>,

    /// Current connection state
    state: ConnectionState,

    /// Consecutive failed connection attempts
    retries: u32,

    /// Incremented on every connect attempt
    generation: u64,

    /// Write side of the open socket
    writer: Option<OwnedWriteHalf>,

    /// Task reading lines from the open socket
    reader_task: Option<JoinHandle<()>>,

    /// Task ticking the heartbeat interval
    heartbeat_task: Option<JoinHandle<()>>,

    /// Pending reconnect timer
    reconnect_task: Option<JoinHandle<()>>,

    /// Sender handed to every spawned task
    events: mpsc::Sender<WorldEvent>,

    /// Set by `shutdown`; no further connects happen
    stopped: bool,
}

impl ConnectionManager {
    /// Create a manager and the receiver its tasks post events to
    pub fn new(
        config: WorldConfig,
        health: Arc<dyn HealthSink>,
    ) -> (Self, mpsc::Receiver<WorldEvent>) {
        let (events, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let policy = RetryPolicy::from(&config);

        let manager = Self {
            config,
            policy,
            health,
            state: ConnectionState::Disconnected,
            retries: 0,
            generation: 0,
            writer: None,
            reader_task: None,
            heartbeat_task: None,
            reconnect_task: None,
            events,
            stopped: false,
        };

        (manager, rx)
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check if the socket is open
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Consecutive failed attempts since the last successful connect
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Generation of the latest connect attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the heartbeat timer is running
    pub fn heartbeat_active(&self) -> bool {
        self.heartbeat_task.is_some()
    }

    /// Whether a reconnect is scheduled
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Start a connect attempt
    ///
    /// Does nothing while a socket is open or being opened, or after shutdown.
    pub fn connect(&mut self) {
        if self.stopped {
            return;
        }

        if self.state.is_active() {
            tracing::debug!(state = %self.state, "Connect requested while already active");
            return;
        }

        self.reconnect_task = None;
        self.generation += 1;
        self.state = ConnectionState::Connecting;

        let generation = self.generation;
        let address = self.config.address();
        let events = self.events.clone();

        tracing::info!(
            world = %self.config.name,
            address = %address,
            generation = generation,
            "Connecting to world server"
        );

        tokio::spawn(async move {
            let event = match TcpStream::connect(&address).await {
                Ok(stream) => WorldEvent::Connected { generation, stream },
                Err(error) => WorldEvent::ConnectFailed { generation, error },
            };
            let _ = events.send(event).await;
        });
    }

    /// Apply an event from a connection task
    ///
    /// Returns the parsed frame when the event carried a valid data line.
    pub async fn handle_event(&mut self, event: WorldEvent) -> Option<InboundWorldFrame> {
        if event.generation() != self.generation || self.stopped {
            tracing::trace!(
                kind = event.kind(),
                event_generation = event.generation(),
                generation = self.generation,
                "Ignoring stale world event"
            );
            return None;
        }

        match event {
            WorldEvent::Connected { stream, .. } => {
                if self.state == ConnectionState::Connecting {
                    self.on_connected(stream).await;
                }
                None
            }
            WorldEvent::ConnectFailed { error, .. } => {
                if self.state == ConnectionState::Connecting {
                    tracing::error!(
                        world = %self.config.name,
                        error = %error,
                        "Error received from world server"
                    );
                    self.on_error(&error);
                }
                None
            }
            WorldEvent::Line { line, .. } => Self::parse_line(&line),
            WorldEvent::Closed { error, .. } => {
                if self.state == ConnectionState::Connected {
                    self.teardown();
                    match error {
                        None => self.on_clean_close(),
                        Some(error) => {
                            tracing::error!(
                                world = %self.config.name,
                                error = %error,
                                "Error received from world server"
                            );
                            self.on_error(&error);
                        }
                    }
                }
                None
            }
            WorldEvent::HeartbeatTick { .. } => {
                if self.is_connected() && self.send(&OutboundWorldFrame::heartbeat()).await.is_ok() {
                    tracing::debug!("Heartbeat sent to world server");
                }
                None
            }
            WorldEvent::ReconnectDue { .. } => {
                self.reconnect_task = None;
                self.connect();
                None
            }
        }
    }

    /// Write a frame to the socket
    ///
    /// Frames are never queued: while disconnected the frame is dropped and
    /// `NotConnected` returned. A write failure tears the socket down through
    /// the error path before the error is returned.
    pub async fn send(&mut self, frame: &OutboundWorldFrame) -> WorldResult<()> {
        let Some(writer) = self.writer.as_mut() else {
            tracing::debug!(channel = %frame.channel, "World server not connected, dropping frame");
            return Err(WorldError::NotConnected);
        };

        let line = frame.to_line()?;
        let result = writer.write_all(line.as_bytes()).await;

        if let Err(error) = result {
            tracing::warn!(
                world = %self.config.name,
                error = %error,
                "Write to world server failed"
            );
            self.teardown();
            self.on_error(&error);
            return Err(WorldError::Io(error));
        }

        if frame.is_control() {
            tracing::trace!(channel = %frame.channel, "Control frame written to world server");
        } else {
            tracing::debug!(channel = %frame.channel, "Frame written to world server");
        }
        Ok(())
    }

    /// Close everything and stop reconnecting
    pub fn shutdown(&mut self) {
        self.stopped = true;
        if let Some(task) = self.reconnect_task.take() {
            task.abort();
        }
        if self.state == ConnectionState::Connected {
            self.teardown();
        }
        self.state = ConnectionState::Disconnected;
        tracing::info!(world = %self.config.name, "World connection shut down");
    }

    async fn on_connected(&mut self, stream: TcpStream) {
        self.retries = 0;
        self.state = ConnectionState::Connected;

        tracing::info!(
            world = %self.config.name,
            address = %self.config.address(),
            "Connected to world server"
        );
        self.health.set_world_connected(true);

        let (read_half, write_half) = stream.into_split();
        self.writer = Some(write_half);
        self.reader_task = Some(tokio::spawn(read_loop(
            self.generation,
            read_half,
            self.events.clone(),
        )));
        self.start_heartbeat();

        if let Some(token) = self.config.auth_token.clone() {
            if self.send(&OutboundWorldFrame::auth(token)).await.is_ok() {
                tracing::info!("Authentication token sent to world server");
            }
        }
    }

    /// (Re)start the heartbeat; the first tick fires one interval after connect
    fn start_heartbeat(&mut self) {
        if let Some(task) = self.heartbeat_task.take() {
            task.abort();
        }

        let period = self.config.heartbeat_interval().max(MIN_HEARTBEAT_INTERVAL);
        let generation = self.generation;
        let events = self.events.clone();

        self.heartbeat_task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if events.send(WorldEvent::HeartbeatTick { generation }).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Drop the socket, stop its tasks, and report disconnection
    fn teardown(&mut self) {
        if let Some(task) = self.heartbeat_task.take() {
            task.abort();
        }
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        self.writer = None;

        tracing::info!(
            world = %self.config.name,
            address = %self.config.address(),
            "Disconnected from world server"
        );
        self.health.set_world_connected(false);
    }

    /// Clean close: always reconnect once, regardless of the retry counter
    fn on_clean_close(&mut self) {
        self.state = ConnectionState::Disconnected;
        tracing::info!("Reconnecting...");
        self.schedule_reconnect();
    }

    /// Error: the retry policy decides
    fn on_error(&mut self, error: &io::Error) {
        self.state = ConnectionState::Retrying;

        match self.policy.on_error(&mut self.retries) {
            RetryDecision::Retry { attempt, max } => {
                tracing::info!(
                    attempt = attempt,
                    max = ?max,
                    error_kind = ?error.kind(),
                    "Retrying world server connection"
                );
                self.schedule_reconnect();
            }
            RetryDecision::GiveUp { attempts } => {
                tracing::error!(
                    world = %self.config.name,
                    attempts = attempts,
                    "Max retries reached. Stopping reconnection attempts."
                );
                self.state = ConnectionState::Disconnected;
            }
        }
    }

    fn schedule_reconnect(&mut self) {
        let delay = self.config.retry_delay();
        let generation = self.generation;
        let events = self.events.clone();

        self.reconnect_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(WorldEvent::ReconnectDue { generation }).await;
        }));
    }

    fn parse_line(line: &str) -> Option<InboundWorldFrame> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match InboundWorldFrame::from_line(line) {
            Ok(frame) => {
                tracing::trace!(channel = %frame.channel, "Frame received from world server");
                Some(frame)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse frame from world server");
                None
            }
        }
    }
}

/// Read newline-delimited frames until the socket closes
///
/// Invalid UTF-8 is replaced rather than treated as a socket error, so a
/// bad frame is rejected by the parser without dropping the connection.
async fn read_loop(generation: u64, read_half: OwnedReadHalf, events: mpsc::Sender<WorldEvent>) {
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    let error = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).into_owned();
                if events.send(WorldEvent::Line { generation, line }).await.is_err() {
                    return;
                }
            }
            Err(e) => break Some(e),
        }
    };

    let _ = events.send(WorldEvent::Closed { generation, error }).await;
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        for task in [
            self.heartbeat_task.take(),
            self.reader_task.take(),
            self.reconnect_task.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("world", &self.config.name)
            .field("state", &self.state)
            .field("retries", &self.retries)
            .field("generation", &self.generation)
            .finish()
    }
}
