// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured handler output consumed by the response formatter.

use serde::Serialize;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

/// Every outcome a turn can end in. The formatter keys templates by these.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum ResultKind {
    ScheduleCreated,
    ScheduleEmpty,
    InvalidRange,
    InactiveMinistry,
    InvalidRecurrence,
    MinistryNotFound,
    AssignmentAccepted,
    AssignmentUnavailable,
    AssignmentConflict,
    AssignmentDuplicate,
    OccurrenceNotFound,
    OccurrenceAmbiguous,
    UserNotFound,
    AssignmentList,
    AssignmentListEmpty,
    Roster,
    RosterEmpty,
    StatusUpdated,
    StatusTransitionInvalid,
    AssignmentMissing,
    Stats,
    Clarification,
    Reset,
    Help,
    SystemError,
}

/// What a handler (or the router itself) produced for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    pub kind: ResultKind,
    pub fields: Map<String, Value>,
}

impl HandlerResult {
    pub fn new(kind: ResultKind) -> Self {
        Self {
            kind,
            fields: Map::new(),
        }
    }

    /// Adds a named field. Values that fail to serialize are stored as null,
    /// which the formatter then treats as missing.
    pub fn with(mut self, name: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A capability failed or timed out; the user is asked to try again.
    pub fn system_error(operation: &str) -> Self {
        Self::new(ResultKind::SystemError).with("operation", operation)
    }

    pub fn is_system_error(&self) -> bool {
        self.kind == ResultKind::SystemError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_fields() {
        let result = HandlerResult::new(ResultKind::ScheduleCreated)
            .with("count", 4)
            .with("day_label", "Sunday")
            .with("month", "January");
        assert_eq!(result.field("count"), Some(&Value::from(4)));
        assert_eq!(result.field("day_label"), Some(&Value::from("Sunday")));
        assert!(result.field("ministry").is_none());
    }

    #[test]
    fn kind_labels_are_snake_case() {
        assert_eq!(ResultKind::AssignmentConflict.to_string(), "assignment_conflict");
        assert!(HandlerResult::system_error("repository").is_system_error());
    }
}
