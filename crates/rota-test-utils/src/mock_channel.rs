// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process channel: tests push inbound text and read back replies.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use rota_core::{
    AdapterType, ChannelAdapter, ConversationKey, HealthStatus, InboundMessage, OutboundMessage,
    PluginAdapter, RotaError,
};

/// A mock messaging channel.
///
/// - **inbound**: messages injected via `inject()` are returned by `receive()`
/// - **sent**: replies passed to `send()` are captured for `sent_messages()`
///
/// After `close()`, `receive()` drains the queue and then reports the
/// transport as closed.
pub struct MockChannel {
    inbound: Mutex<VecDeque<InboundMessage>>,
    sent: Mutex<Vec<OutboundMessage>>,
    inbound_ready: Notify,
    sent_ready: Arc<Notify>,
    closed: AtomicBool,
    health: Mutex<HealthStatus>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            inbound_ready: Notify::new(),
            sent_ready: Arc::new(Notify::new()),
            closed: AtomicBool::new(false),
            health: Mutex::new(HealthStatus::Healthy),
        }
    }

    pub async fn inject(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.inbound_ready.notify_one();
    }

    /// Injects `text` from `sender` on the "mock" channel.
    pub async fn inject_text(&self, sender: &str, text: &str) {
        self.inject(InboundMessage::new(ConversationKey::new("mock", sender), text))
            .await;
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.inbound_ready.notify_one();
    }

    /// What the next `health_check()` reports.
    pub async fn set_health(&self, status: HealthStatus) {
        *self.health.lock().await = status;
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    /// Replies sent to one conversation, in order.
    pub async fn replies_to(&self, key: &ConversationKey) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| &m.key == key)
            .map(|m| m.text.clone())
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Waits until at least `count` replies were sent. Returns `false` if
    /// `limit` elapses first.
    pub async fn wait_for_sent(&self, count: usize, limit: Duration) -> bool {
        tokio::time::timeout(limit, async {
            loop {
                let notified = self.sent_ready.notified();
                if self.sent_count().await >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RotaError> {
        Ok(self.health.lock().await.clone())
    }

    async fn shutdown(&self) -> Result<(), RotaError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn receive(&self) -> Result<Option<InboundMessage>, RotaError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(Some(msg));
                }
                if self.closed.load(Ordering::SeqCst) {
                    return Ok(None);
                }
            }
            self.inbound_ready.notified().await;
        }
    }

    async fn send(&self, msg: OutboundMessage) -> Result<(), RotaError> {
        self.sent.lock().await.push(msg);
        self.sent_ready.notify_waiters();
        Ok(())
    }
}
