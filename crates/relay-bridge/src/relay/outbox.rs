//! Sequential chat sender
//!
//! Discord HTTP calls are made from a dedicated task so the dispatcher never
//! waits on them. Items are sent one at a time, in the order queued.

use relay_core::{ChatGateway, HealthSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A chat message waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxItem {
    pub channel_id: String,
    pub text: String,
}

/// Handle to the outbox task
#[derive(Debug)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<OutboxItem>,
    task: JoinHandle<()>,
}

impl Outbox {
    /// Spawn the sender task
    pub fn spawn(gateway: Arc<dyn ChatGateway>, health: Arc<dyn HealthSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboxItem>();

        let task = tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                match gateway.send(&item.channel_id, &item.text).await {
                    Ok(()) => {
                        health.increment_world_to_chat();
                        tracing::trace!(channel_id = %item.channel_id, "Message sent to chat");
                    }
                    Err(e) => {
                        tracing::warn!(
                            channel_id = %item.channel_id,
                            error = %e,
                            "Failed to send message to chat"
                        );
                    }
                }
            }
        });

        Self { tx, task }
    }

    /// Queue a message; returns false once the task has stopped
    pub fn push(&self, channel_id: impl Into<String>, text: impl Into<String>) -> bool {
        self.tx
            .send(OutboxItem {
                channel_id: channel_id.into(),
                text: text.into(),
            })
            .is_ok()
    }

    /// Stop the task, dropping anything still queued
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for Outbox {
    fn drop(&mut self) {
        self.task.abort();
    }
}
