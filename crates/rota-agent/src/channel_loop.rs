// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives a channel adapter: receive, process, reply.
//!
//! Each conversation key gets a worker task fed by its own queue, so turns
//! for one key run strictly in arrival order while different keys run in
//! parallel. Workers exit after sitting idle and are respawned on demand;
//! a respawned worker waits for its predecessor to finish first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rota_core::{
    ChannelAdapter, ConversationKey, HealthStatus, InboundMessage, OutboundMessage, RotaError,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::processor::TurnProcessor;

struct Worker {
    tx: mpsc::UnboundedSender<InboundMessage>,
    handle: JoinHandle<()>,
}

type Workers = HashMap<ConversationKey, Worker>;

pub struct ChannelLoop {
    channel: Arc<dyn ChannelAdapter>,
    processor: Arc<TurnProcessor>,
    idle_interval: Duration,
    drain_timeout: Duration,
}

impl ChannelLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, processor: Arc<TurnProcessor>) -> Self {
        Self {
            channel,
            processor,
            idle_interval: Duration::from_secs(60),
            drain_timeout: Duration::from_secs(30),
        }
    }

    /// How often idle memory is purged; also how long a worker waits for
    /// its next message before exiting.
    pub fn idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// How long shutdown waits for queued turns to finish.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Runs until `cancel` fires or the channel closes, then drains queued
    /// turns and shuts the channel down.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RotaError> {
        match self.channel.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => {
                warn!(channel = self.channel.name(), %reason, "channel degraded, starting anyway");
            }
            HealthStatus::Unhealthy(reason) => {
                return Err(RotaError::Channel {
                    message: format!("{} is unhealthy: {reason}", self.channel.name()),
                });
            }
        }
        info!(
            channel = self.channel.name(),
            version = %self.channel.version(),
            "channel loop running"
        );
        let tracker = TaskTracker::new();
        let mut workers = Workers::new();
        let mut purge = tokio::time::interval(self.idle_interval);
        purge.set_missed_tick_behavior(MissedTickBehavior::Delay);
        purge.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested, stopping channel loop");
                    break;
                }
                _ = purge.tick() => {
                    workers.retain(|_, w| !w.handle.is_finished());
                    let removed = self.processor.memory().purge_idle();
                    if removed > 0 {
                        debug!(removed, "purged idle conversations");
                    }
                }
                received = self.channel.receive() => match received {
                    Ok(Some(message)) => self.dispatch(&tracker, &mut workers, message),
                    Ok(None) => {
                        info!("channel closed, stopping channel loop");
                        break;
                    }
                    Err(e) => error!(error = %e, "channel receive error"),
                },
            }
        }

        // Dropping the senders lets each worker finish its queue and exit.
        drop(workers);
        tracker.close();
        if timeout(self.drain_timeout, tracker.wait()).await.is_err() {
            warn!(remaining = tracker.len(), "drain timeout reached, abandoning queued turns");
        }
        self.channel.shutdown().await?;
        info!("channel loop stopped");
        Ok(())
    }

    fn dispatch(&self, tracker: &TaskTracker, workers: &mut Workers, mut message: InboundMessage) {
        if let Some(current) = workers.get(&message.key) {
            match current.tx.send(message) {
                Ok(()) => return,
                // The worker went idle and closed its queue.
                Err(mpsc::error::SendError(returned)) => message = returned,
            }
        }

        let key = message.key.clone();
        let previous = workers.remove(&key).map(|w| w.handle);
        let (tx, rx) = mpsc::unbounded_channel();
        // A fresh receiver cannot have closed yet.
        let _ = tx.send(message);
        debug!(conversation = %key, handoff = previous.is_some(), "starting conversation worker");
        let handle = tracker.spawn(worker(
            self.processor.clone(),
            self.channel.clone(),
            key.clone(),
            rx,
            self.idle_interval,
            previous,
        ));
        workers.insert(key, Worker { tx, handle });
    }
}

async fn worker(
    processor: Arc<TurnProcessor>,
    channel: Arc<dyn ChannelAdapter>,
    key: ConversationKey,
    mut rx: mpsc::UnboundedReceiver<InboundMessage>,
    idle: Duration,
    previous: Option<JoinHandle<()>>,
) {
    // A closed queue may still hold turns the old worker has to finish.
    if let Some(previous) = previous {
        if let Err(e) = previous.await {
            warn!(conversation = %key, error = %e, "previous conversation worker failed");
        }
    }
    loop {
        let message = match timeout(idle, rx.recv()).await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(_) => {
                // Refuse new messages, then finish whatever is already queued.
                rx.close();
                continue;
            }
        };
        let report = processor.process(&message).await;
        let reply = OutboundMessage {
            key: report.key,
            text: report.reply,
        };
        if let Err(e) = channel.send(reply).await {
            error!(conversation = %key, error = %e, "failed to deliver reply");
        }
    }
    debug!(conversation = %key, "conversation worker stopped");
}
