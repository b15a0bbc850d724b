// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turn testing.
//!
//! `TestHarness` assembles the full turn pipeline (memory, router,
//! handlers, formatter) over an [`InMemoryRepository`] and a
//! [`ManualClock`]. `say()` drives one turn from a named sender.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rota_agent::{TurnProcessor, TurnReport};
use rota_config::RotaConfig;
use rota_core::{
    ClassifierAdapter, ConversationKey, IntentHandler, Ministry, MinistryId, RotaError, UserId,
    UserRecord,
};
use rota_router::KeywordClassifier;
use rota_storage::{InMemoryRepository, InMemoryRepositoryBuilder, SeedData};

use crate::clock::ManualClock;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    config: RotaConfig,
    repository: InMemoryRepositoryBuilder,
    classifier: Option<Arc<dyn ClassifierAdapter>>,
    handlers: Vec<Arc<dyn IntentHandler>>,
    today: NaiveDate,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: RotaConfig::default(),
            repository: InMemoryRepository::builder(),
            classifier: None,
            handlers: Vec::new(),
            today: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap_or_default(),
        }
    }

    /// The date the manual clock starts on (noon UTC).
    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(mut self, config: RotaConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default keyword classifier.
    pub fn classifier(mut self, classifier: Arc<dyn ClassifierAdapter>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Registers an extra or replacement intent handler.
    pub fn handler(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn ministry(mut self, name: &str, active: bool) -> Self {
        self.repository = self.repository.ministry(Ministry {
            id: MinistryId(name.to_lowercase().replace(' ', "-")),
            name: name.to_string(),
            leader: None,
            is_active: active,
        });
        self
    }

    /// Adds an active, available user whose id is their lowercased first
    /// name and whose phone number is `phone`.
    pub fn user(mut self, first: &str, last: &str, phone: &str) -> Self {
        self.repository = self.repository.user(UserRecord {
            id: UserId(first.to_lowercase()),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone_number: phone.to_string(),
            is_active: true,
            is_available: true,
        });
        self
    }

    pub fn unavailable(mut self, user_id: &str, date: NaiveDate) -> Self {
        self.repository = self.repository.unavailable(&UserId::from(user_id), date);
        self
    }

    /// Loads ministries and users from a TOML seed document.
    pub fn seed_toml(mut self, toml: &str) -> Result<Self, RotaError> {
        self.repository = SeedData::from_toml_str(toml)?.apply(self.repository);
        Ok(self)
    }

    pub fn repository_latency(mut self, latency: Duration) -> Self {
        self.repository = self.repository.latency(latency);
        self
    }

    pub fn build(self) -> TestHarness {
        let clock = Arc::new(ManualClock::on(self.today));
        let repository = Arc::new(self.repository.build());
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(KeywordClassifier::new()));
        let processor = Arc::new(TurnProcessor::with_handlers(
            &self.config,
            repository.clone(),
            classifier,
            clock.clone(),
            self.handlers,
        ));
        TestHarness {
            processor,
            repository,
            clock,
        }
    }
}

/// A complete turn pipeline for tests.
pub struct TestHarness {
    pub processor: Arc<TurnProcessor>,
    pub repository: Arc<InMemoryRepository>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Conversation key for `sender` on the harness channel.
    pub fn key(sender: &str) -> ConversationKey {
        ConversationKey::new("test", sender)
    }

    /// Runs one turn from `sender` and returns the full report.
    pub async fn say(&self, sender: &str, text: &str) -> TurnReport {
        self.processor.process_text(Self::key(sender), text).await
    }

    /// Runs one turn and returns just the reply text.
    pub async fn reply(&self, sender: &str, text: &str) -> String {
        self.say(sender, text).await.reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn help_for_small_talk() {
        let harness = TestHarness::builder().build();
        let reply = harness.reply("5511", "good morning!").await;
        assert!(reply.starts_with("I can help with:"), "{reply}");
    }
}
