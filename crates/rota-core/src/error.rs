// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rota scheduling assistant.

use chrono::NaiveDate;
use thiserror::Error;

/// The primary error type used across all Rota adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RotaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository capability errors (lookup or commit failure).
    #[error("repository error: {message}")]
    Repository {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Intent classifier capability errors.
    #[error("classifier error: {message}")]
    Classifier { message: String },

    /// An intent handler failed in a way that is not a business outcome.
    #[error("handler error: {message}")]
    Handler { message: String },

    /// Channel adapter errors (closed transport, delivery failure).
    #[error("channel error: {message}")]
    Channel { message: String },

    /// A capability call did not complete in time.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Schedule generation rejected its inputs.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RotaError {
    /// Shorthand for a repository failure without an underlying source.
    pub fn repository(message: impl Into<String>) -> Self {
        RotaError::Repository {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error came from a capability timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RotaError::Timeout { .. })
    }
}

/// Reasons schedule generation refuses to produce occurrences.
///
/// Each variant is fatal to the generation call and nothing is committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The end date precedes the start date.
    #[error("invalid range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The ministry is not active and cannot create schedules.
    #[error("ministry `{ministry}` is inactive")]
    InactiveMinistry { ministry: String },

    /// The recurrence rule is malformed or names the same day twice.
    #[error("invalid recurrence: {detail}")]
    InvalidRecurrence { detail: String },
}
