// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic classifier for router and agent tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rota_core::{
    AdapterType, Classification, ClassifierAdapter, HealthStatus, PluginAdapter, RotaError,
};

enum Step {
    Answer(Classification),
    Fail(String),
}

/// Answers from a script first, then from keyword rules.
///
/// Every call is counted so tests can assert that a turn did or did not
/// consult the classifier.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Step>>,
    rules: Vec<(String, Classification)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            rules: Vec::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Messages containing `keyword` (case-insensitive) classify as `label`
    /// with full confidence.
    pub fn rule(mut self, keyword: &str, label: &str) -> Self {
        self.rules
            .push((keyword.to_lowercase(), Classification::new(label, 1.0)));
        self
    }

    /// Queues one answer, consumed before any rule applies.
    pub fn then_answer(self, label: &str, confidence: f32) -> Self {
        self.push(Step::Answer(Classification::new(label, confidence)));
        self
    }

    /// Queues one failure.
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Step::Fail(message.to_string()));
        self
    }

    /// Sleeps before every answer, to exercise timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(&self, step: Step) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(step);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RotaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RotaError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for ScriptedClassifier {
    async fn classify(&self, text: &str, _recent: &[String]) -> Result<Classification, RotaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let step = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match step {
            Some(Step::Answer(c)) => return Ok(c),
            Some(Step::Fail(message)) => return Err(RotaError::Classifier { message }),
            None => {}
        }
        let lower = text.to_lowercase();
        Ok(self
            .rules
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, c)| c.clone())
            .unwrap_or_else(|| Classification::new("unrecognized", 0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_then_rules() {
        let classifier = ScriptedClassifier::new()
            .rule("roster", "roster")
            .then_answer("reset", 0.9)
            .then_fail("boom");

        let first = classifier.classify("roster please", &[]).await.unwrap();
        assert_eq!(first.label, "reset");
        assert!(classifier.classify("roster please", &[]).await.is_err());
        let third = classifier.classify("ROSTER please", &[]).await.unwrap();
        assert_eq!(third.label, "roster");
        assert_eq!(classifier.classify("hi", &[]).await.unwrap().label, "unrecognized");
        assert_eq!(classifier.calls(), 4);
    }
}
