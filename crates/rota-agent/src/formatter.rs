// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response formatter: `HandlerResult` -> reply text.
//!
//! Each [`ResultKind`] has a template that expects a fixed set of fields.
//! Rendering uses strict undefined handling, so a template that references
//! a field the result lacks fails, and the formatter answers with a generic
//! fallback instead of surfacing the error.

use std::collections::BTreeMap;
use std::str::FromStr;

use minijinja::{Environment, UndefinedBehavior, Value};
use rota_config::ResponsesConfig;
use rota_core::{HandlerResult, ResultKind};
use tracing::{debug, warn};

/// Sent when a template cannot be rendered.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't put that reply together. Please try again.";

/// Built-in templates, one per result kind.
pub fn default_template(kind: ResultKind) -> &'static str {
    match kind {
        ResultKind::ScheduleCreated => {
            "Created {{ count }} {{ day_label }} occurrence{% if count != 1 %}s{% endif %} for {{ ministry }} in {{ month }}."
        }
        ResultKind::ScheduleEmpty => {
            "No {{ day_label }} falls between {{ start }} and {{ end }}, so nothing was scheduled for {{ ministry }}."
        }
        ResultKind::InvalidRange => {
            "{% if max_span_days is defined %}A schedule can cover at most {{ max_span_days }} days; {{ start }} to {{ end }} is too long.{% else %}The end date {{ end }} is before the start date {{ start }}.{% endif %}"
        }
        ResultKind::InactiveMinistry => "{{ ministry }} is inactive, so it can't create schedules.",
        ResultKind::InvalidRecurrence => "That recurrence doesn't work: {{ detail }}.",
        ResultKind::MinistryNotFound => "I couldn't find a ministry called {{ ministry }}.",
        ResultKind::AssignmentAccepted => {
            "Done! {{ user }} is on {{ role }} for {{ ministry }} on {{ day_label }}, {{ date }}."
        }
        ResultKind::AssignmentUnavailable => "{{ user }} isn't available on {{ date }}.",
        ResultKind::AssignmentConflict => {
            "{{ holder }} is already on {{ role }} on {{ date }}, so I can't add {{ user }}."
        }
        ResultKind::AssignmentDuplicate => "{{ user }} is already on {{ role }} on {{ date }}.",
        ResultKind::OccurrenceNotFound => {
            "There's nothing scheduled{% if ministry is defined %} for {{ ministry }}{% endif %} on {{ date }}."
        }
        ResultKind::OccurrenceAmbiguous => {
            "More than one ministry serves on {{ date }} ({{ ministries|join(', ') }}). Which one did you mean?"
        }
        ResultKind::UserNotFound => "I don't know who {{ user }} is.",
        ResultKind::AssignmentList => {
            "{{ user }}'s assignments:{% for a in items %}\n- {{ a.day_label }} {{ a.date }}: {{ a.role }} ({{ a.ministry }}, {{ a.status }}){% endfor %}"
        }
        ResultKind::AssignmentListEmpty => {
            "{{ user }} has no assignments between {{ start }} and {{ end }}."
        }
        ResultKind::Roster => {
            "Serving {{ period }}:{% for a in items %}\n- {{ a.date }} {{ a.ministry }}, {{ a.role }}: {{ a.user }}{% if a.status != 'CONFIRMED' %} ({{ a.status }}){% endif %}{% endfor %}"
        }
        ResultKind::RosterEmpty => "Nobody is scheduled {{ period }}.",
        ResultKind::StatusUpdated => {
            "Got it. {{ user }}'s {{ role }} assignment on {{ date }} is now {{ status }}."
        }
        ResultKind::StatusTransitionInvalid => {
            "That assignment is {{ from }} and can't be changed to {{ to }}."
        }
        ResultKind::AssignmentMissing => "{{ user }} has no assignment on {{ date }}.",
        ResultKind::Stats => {
            "Between {{ start }} and {{ end }}: {{ total }} assignments, {{ confirmed }} confirmed, {{ declined }} declined ({{ confirmation_rate }}% confirmation rate)."
        }
        ResultKind::Clarification => {
            "To {{ intent|replace('_', ' ') }}, I still need the {{ missing|join(' and ') }}."
        }
        ResultKind::Reset => "Okay, I've cleared our conversation.",
        ResultKind::Help => {
            "I can help with: {{ intents|join(', ') }}. Try \"create a schedule for Worship every Sunday in January\"."
        }
        ResultKind::SystemError => "Something went wrong on my side. Please try again in a moment.",
    }
}

/// Renders handler results into reply text.
pub struct ResponseFormatter {
    env: Environment<'static>,
    templates: BTreeMap<ResultKind, String>,
}

impl ResponseFormatter {
    /// Formatter with the built-in templates only.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self {
            env,
            templates: BTreeMap::new(),
        }
    }

    /// Formatter with configured overrides layered over the built-ins.
    /// Keys that do not name a result kind are ignored (config validation
    /// reports them).
    pub fn from_config(config: &ResponsesConfig) -> Self {
        let mut formatter = Self::new();
        for (key, template) in &config.templates {
            match ResultKind::from_str(key) {
                Ok(kind) => {
                    formatter.templates.insert(kind, template.clone());
                }
                Err(_) => debug!(key = %key, "ignoring template for unknown result kind"),
            }
        }
        formatter
    }

    fn template(&self, kind: ResultKind) -> &str {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| default_template(kind))
    }

    /// Renders `result`. Never fails: a missing field yields [`FALLBACK_REPLY`].
    pub fn format(&self, result: &HandlerResult) -> String {
        let ctx = Value::from_serialize(&result.fields);
        match self.env.render_str(self.template(result.kind), ctx) {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = %result.kind, error = %e, "response template failed, using fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn schedule_created_uses_count_day_and_month() {
        let result = HandlerResult::new(ResultKind::ScheduleCreated)
            .with("count", 4)
            .with("day_label", "Sunday")
            .with("month", "January 2024")
            .with("ministry", "Worship");
        assert_eq!(
            ResponseFormatter::new().format(&result),
            "Created 4 Sunday occurrences for Worship in January 2024."
        );
    }

    #[test]
    fn missing_field_fails_closed() {
        let result = HandlerResult::new(ResultKind::ScheduleCreated).with("count", 4);
        assert_eq!(ResponseFormatter::new().format(&result), FALLBACK_REPLY);
    }

    #[test]
    fn optional_fields_use_defined_tests() {
        let f = ResponseFormatter::new();
        let plain = HandlerResult::new(ResultKind::OccurrenceNotFound).with("date", "2024-01-07");
        assert_eq!(f.format(&plain), "There's nothing scheduled on 2024-01-07.");
        let scoped = plain.clone().with("ministry", "Media");
        assert_eq!(f.format(&scoped), "There's nothing scheduled for Media on 2024-01-07.");
    }

    #[test]
    fn overrides_replace_builtins() {
        let mut config = ResponsesConfig::default();
        config
            .templates
            .insert("reset".into(), "Fresh start, {{ who }}!".into());
        config.templates.insert("not_a_kind".into(), "x".into());
        let f = ResponseFormatter::from_config(&config);
        assert_eq!(
            f.format(&HandlerResult::new(ResultKind::Reset).with("who", "Ana")),
            "Fresh start, Ana!"
        );
        assert_eq!(f.format(&HandlerResult::new(ResultKind::Reset)), FALLBACK_REPLY);
    }

    #[test]
    fn every_builtin_template_parses() {
        let env = Environment::new();
        for kind in ResultKind::iter() {
            assert!(env.template_from_str(default_template(kind)).is_ok(), "{kind}");
        }
    }

    #[test]
    fn lists_render_one_line_per_item() {
        let result = HandlerResult::new(ResultKind::AssignmentList)
            .with("user", "Maria Silva")
            .with(
                "items",
                serde_json::json!([
                    {"date": "2024-01-07", "day_label": "Sunday", "role": "sound tech", "ministry": "Worship", "status": "ASSIGNED"},
                    {"date": "2024-01-14", "day_label": "Sunday", "role": "media", "ministry": "Worship", "status": "CONFIRMED"}
                ]),
            );
        assert_eq!(
            ResponseFormatter::new().format(&result),
            "Maria Silva's assignments:\n- Sunday 2024-01-07: sound tech (Worship, ASSIGNED)\n- Sunday 2024-01-14: media (Worship, CONFIRMED)"
        );
    }
}
