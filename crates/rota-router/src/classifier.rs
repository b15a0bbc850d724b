// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic intent classification.
//!
//! Scores a message against weighted patterns per intent. No model, no
//! network, no latency. Stands in for an external classifier when none is
//! configured and gives the shell something deterministic to talk to.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rota_core::{
    AdapterType, Classification, ClassifierAdapter, HealthStatus, IntentKind, PluginAdapter,
    RotaError,
};

/// Weight at which a single pattern is conclusive.
const FULL_SCORE: u32 = 3;

static PATTERNS: LazyLock<Vec<(IntentKind, u32, Regex)>> = LazyLock::new(|| {
    use IntentKind::*;
    [
        (Reset, 3, r"^\s*(reset|start\s+over|forget\s+(it|everything)|clear(\s+context)?|never\s*mind)\s*[.!]*\s*$"),
        (CreateSchedule, 3, r"\b(create|make|set\s+up|build|generate|plan)\b.*\bschedules?\b"),
        (CreateSchedule, 2, r"\bschedule\s+(for\s+)?(every|all|each)\b"),
        (CreateSchedule, 1, r"\bnew\s+schedule\b"),
        (AssignVolunteer, 3, r"\bassign\b"),
        (AssignVolunteer, 2, r"\b(put|add|book|schedule)\s+(me|him|her|them|\w+)\s+(on|for|to|as|in)\b"),
        (AssignVolunteer, 1, r"\b(cover|serve\s+as|fill\s+in)\b"),
        (MyAssignments, 3, r"\bmy\s+(assignments?|schedule|shifts?|roles?)\b"),
        (MyAssignments, 3, r"\bwhen\s+(am|do)\s+i\s+(serving|serve|on)\b"),
        (MyAssignments, 2, r"\b(assignments?|shifts?)\s+for\s+\w+"),
        (Roster, 3, r"\b(roster|line-?up)\b"),
        (Roster, 2, r"\bwho('s|\s+is|\s+are)\s+(serving|on|scheduled|playing|leading)\b"),
        (ConfirmAssignment, 3, r"\b(confirm|i('ll|\s+will)\s+be\s+there|count\s+me\s+in)\b"),
        (ConfirmAssignment, 1, r"^\s*(yes|yep|sure)\b"),
        (DeclineAssignment, 3, r"\b(decline|can('t|not)\s+(make|come|serve|do)|won't\s+be\s+(there|able)|cancel\s+my)\b"),
        (AssignmentStats, 3, r"\b(stats|statistics|confirmation\s+rate)\b"),
        (AssignmentStats, 2, r"\bhow\s+many\s+(assignments|volunteers|confirmed|declined)\b"),
    ]
    .into_iter()
    .map(|(intent, weight, pattern)| {
        (intent, weight, Regex::new(&format!("(?i){pattern}")).expect("Invalid regex"))
    })
    .collect()
});

/// Zero-cost pattern classifier.
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> Vec<(IntentKind, u32)> {
        let mut scores: Vec<(IntentKind, u32)> = Vec::new();
        for (intent, weight, re) in PATTERNS.iter() {
            if re.is_match(text) {
                match scores.iter_mut().find(|(i, _)| *i == *intent) {
                    Some((_, s)) => *s += weight,
                    None => scores.push((*intent, *weight)),
                }
            }
        }
        scores
    }

    /// Classifies `text`, using the last few `recent` messages to break ties
    /// and to lift weak matches that continue the conversation's topic.
    pub fn classify_text(&self, text: &str, recent: &[String]) -> Classification {
        let mut scores = Self::score(text);
        if scores.is_empty() {
            return Classification::new(IntentKind::Unrecognized.to_string(), 0.0);
        }

        let limit = recent.len().min(3);
        for previous in &recent[recent.len() - limit..] {
            for (intent, _) in Self::score(previous) {
                if let Some((_, s)) = scores.iter_mut().find(|(i, _)| *i == intent) {
                    *s += 1;
                }
            }
        }

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (best, best_score) = scores[0];
        let mut confidence = (best_score as f32 / FULL_SCORE as f32).min(1.0);
        if scores.get(1).is_some_and(|(_, s)| *s == best_score) {
            confidence /= 2.0;
        }
        Classification::new(best.to_string(), confidence)
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
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
impl ClassifierAdapter for KeywordClassifier {
    async fn classify(&self, text: &str, recent: &[String]) -> Result<Classification, RotaError> {
        Ok(self.classify_text(text, recent))
    }
}
