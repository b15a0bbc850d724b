// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed `rota.toml` sections.
//!
//! Every table denies unknown fields so a misspelled key fails at startup
//! instead of silently falling back to its default.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The whole configuration. Any section may be omitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RotaConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Intent classification settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Repository capability settings.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Schedule generation limits.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Reply template overrides.
    #[serde(default)]
    pub responses: ResponsesConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Level for the `rota` log target, used unless `RUST_LOG` is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset from UTC, in minutes, used to decide what "today" is.
    #[serde(default)]
    pub timezone_offset_minutes: i32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            timezone_offset_minutes: 0,
        }
    }
}

fn default_agent_name() -> String {
    "rota".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Raw messages retained per conversation.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seconds of inactivity after which a conversation is forgotten. 0 disables expiry.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// How many of the most recent messages the entity resolver searches
    /// when a slot is missing from both the message and the remembered entities.
    #[serde(default = "default_recency_window")]
    pub recency_window: usize,
}

impl MemoryConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            idle_timeout_secs: default_idle_timeout_secs(),
            recency_window: default_recency_window(),
        }
    }
}

fn default_capacity() -> usize {
    30
}

fn default_idle_timeout_secs() -> u64 {
    3600
}

fn default_recency_window() -> usize {
    3
}

/// Intent classification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Labels below this confidence are treated as unrecognized.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Upper bound on a single classify call.
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            timeout_ms: default_classifier_timeout_ms(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_classifier_timeout_ms() -> u64 {
    3000
}

/// Repository capability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Upper bound on a single handler invocation, covering all its repository calls.
    #[serde(default = "default_repository_timeout_ms")]
    pub timeout_ms: u64,
}

impl RepositoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_repository_timeout_ms(),
        }
    }
}

fn default_repository_timeout_ms() -> u64 {
    5000
}

/// Schedule generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Longest range, in days, a single schedule may span.
    #[serde(default = "default_max_span_days")]
    pub max_span_days: u32,

    /// Window used by "my assignments" when no dates are given.
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_span_days: default_max_span_days(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

fn default_max_span_days() -> u32 {
    366
}

fn default_upcoming_days() -> u32 {
    30
}

/// Reply template overrides, keyed by result kind (e.g. `assignment_conflict`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponsesConfig {
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}
