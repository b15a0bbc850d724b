// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn entry point.
//!
//! One turn: wait for the conversation's turn lock, append the raw message,
//! route it, merge the outcome back into memory (unless the conversation was
//! reset meanwhile), and format the reply.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use rota_config::RotaConfig;
use rota_core::{
    ClassifierAdapter, Clock, ConversationKey, InboundMessage, IntentHandler, IntentKind,
    RepositoryAdapter, ResultKind,
};
use rota_memory::MemoryStore;
use rota_router::{IntentRouter, RouterState, TurnInput};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::formatter::ResponseFormatter;
use crate::handlers::{default_handlers, HandlerDeps};

/// What one processed turn produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub key: ConversationKey,
    pub reply: String,
    pub intent: IntentKind,
    pub kind: ResultKind,
    pub final_state: RouterState,
    pub classified: bool,
    /// Whether the turn's entities were merged into memory.
    pub merged: bool,
}

/// Processes turns for any number of conversations.
pub struct TurnProcessor {
    memory: Arc<MemoryStore>,
    router: IntentRouter,
    repository: Arc<dyn RepositoryAdapter>,
    formatter: ResponseFormatter,
    clock: Arc<dyn Clock>,
    timezone_offset: ChronoDuration,
    repository_timeout: Duration,
}

impl TurnProcessor {
    /// Wires memory, the standard handlers, router, and formatter from config.
    pub fn new(
        config: &RotaConfig,
        repository: Arc<dyn RepositoryAdapter>,
        classifier: Arc<dyn ClassifierAdapter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_handlers(config, repository, classifier, clock, Vec::new())
    }

    /// Like [`new`](Self::new), with extra handlers registered after the
    /// standard ones (a handler for an already-covered intent replaces it).
    pub fn with_handlers(
        config: &RotaConfig,
        repository: Arc<dyn RepositoryAdapter>,
        classifier: Arc<dyn ClassifierAdapter>,
        clock: Arc<dyn Clock>,
        extra: Vec<Arc<dyn IntentHandler>>,
    ) -> Self {
        let memory = Arc::new(MemoryStore::from_config(&config.memory, clock.clone()));
        let deps = HandlerDeps {
            repository: repository.clone(),
            schedule: config.schedule.clone(),
        };

        let mut builder = IntentRouter::builder(classifier).config(config);
        for handler in default_handlers(deps, memory.clone()).into_iter().chain(extra) {
            builder = builder.handler(handler);
        }

        info!(
            agent = %config.agent.name,
            capacity = config.memory.capacity,
            "turn processor ready"
        );
        Self {
            memory,
            router: builder.build(),
            repository,
            formatter: ResponseFormatter::from_config(&config.responses),
            clock,
            timezone_offset: ChronoDuration::minutes(i64::from(config.agent.timezone_offset_minutes)),
            repository_timeout: config.repository.timeout(),
        }
    }

    pub fn memory(&self) -> &Arc<MemoryStore> {
        &self.memory
    }

    /// The local calendar date relative expressions resolve against.
    pub fn today(&self) -> NaiveDate {
        (self.clock.now() + self.timezone_offset).date_naive()
    }

    /// Ministry names for entity extraction. A failing repository degrades
    /// to an empty list rather than failing the turn.
    async fn ministry_names(&self, key: &ConversationKey) -> Vec<String> {
        match timeout(self.repository_timeout, self.repository.list_ministries()).await {
            Ok(Ok(ministries)) => ministries.into_iter().map(|m| m.name).collect(),
            Ok(Err(e)) => {
                warn!(conversation = %key, error = %e, "could not list ministries");
                Vec::new()
            }
            Err(_) => {
                warn!(conversation = %key, "listing ministries timed out");
                Vec::new()
            }
        }
    }

    /// Runs one turn and returns its reply.
    pub async fn process(&self, message: &InboundMessage) -> TurnReport {
        let key = &message.key;
        let guard = self.memory.begin_turn(key).await;
        let context = self.memory.append(key, &message.text).await;
        debug!(conversation = %key, messages = context.messages.len(), "turn started");

        let ministries = self.ministry_names(key).await;
        let outcome = self
            .router
            .route(TurnInput {
                key,
                text: &message.text,
                context: &context,
                today: self.today(),
                ministries: &ministries,
            })
            .await;

        let merged = match outcome.update.clone() {
            Some(update) => self.memory.commit(&guard, update).await,
            None => false,
        };
        drop(guard);

        let reply = self.formatter.format(&outcome.result);
        info!(
            conversation = %key,
            intent = %outcome.intent,
            result = %outcome.result.kind,
            state = %outcome.final_state(),
            merged,
            "turn complete"
        );
        TurnReport {
            key: key.clone(),
            reply,
            intent: outcome.intent,
            kind: outcome.result.kind,
            final_state: outcome.final_state(),
            classified: outcome.classified,
            merged,
        }
    }

    /// Convenience wrapper for callers holding raw parts.
    pub async fn process_text(&self, key: ConversationKey, text: &str) -> TurnReport {
        self.process(&InboundMessage::new(key, text)).await
    }
}
