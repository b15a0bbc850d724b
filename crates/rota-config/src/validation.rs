// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ranges, non-zero timeouts, and parseable reply templates.

use std::str::FromStr;

use rota_core::ResultKind;
use strum::IntoEnumIterator;

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::RotaConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RotaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(validation("agent.name must not be empty"));
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(validation(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    // UTC-12:00 through UTC+14:00.
    if !(-720..=840).contains(&config.agent.timezone_offset_minutes) {
        errors.push(validation(format!(
            "agent.timezone_offset_minutes must be between -720 and 840, got {}",
            config.agent.timezone_offset_minutes
        )));
    }

    if config.memory.capacity < 1 {
        errors.push(validation("memory.capacity must be at least 1"));
    }

    if config.memory.recency_window > config.memory.capacity {
        errors.push(validation(format!(
            "memory.recency_window ({}) must not exceed memory.capacity ({})",
            config.memory.recency_window, config.memory.capacity
        )));
    }

    let threshold = config.classifier.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(validation(format!(
            "classifier.confidence_threshold must be between 0 and 1, got {threshold}"
        )));
    }

    if config.classifier.timeout_ms == 0 {
        errors.push(validation("classifier.timeout_ms must be greater than 0"));
    }

    if config.repository.timeout_ms == 0 {
        errors.push(validation("repository.timeout_ms must be greater than 0"));
    }

    if config.schedule.max_span_days == 0 {
        errors.push(validation("schedule.max_span_days must be greater than 0"));
    }

    if config.schedule.upcoming_days == 0 {
        errors.push(validation("schedule.upcoming_days must be greater than 0"));
    }

    errors.extend(validate_templates(config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_templates(config: &RotaConfig) -> Vec<ConfigError> {
    let known: Vec<String> = ResultKind::iter().map(|k| k.to_string()).collect();
    let known_refs: Vec<&str> = known.iter().map(String::as_str).collect();

    let mut errors = Vec::new();
    let env = minijinja::Environment::new();
    for (kind, source) in &config.responses.templates {
        if ResultKind::from_str(kind).is_err() {
            errors.push(ConfigError::Template {
                kind: kind.clone(),
                detail: "not a known result kind".to_string(),
                suggestion: suggest_key(kind, &known_refs),
            });
            continue;
        }
        if let Err(err) = env.template_from_str(source) {
            errors.push(ConfigError::Template {
                kind: kind.clone(),
                detail: err.to_string(),
                suggestion: None,
            });
        }
    }
    errors
}

fn validation(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        message: message.into(),
    }
}
