// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use chrono::Datelike;
use rota_core::{
    HandlerRequest, HandlerResult, IntentHandler, IntentKind, ResultKind, RotaError, Schedule,
    ScheduleError, ScheduleId, Slot,
};
use rota_schedule::{generate, schedule_title};
use tracing::info;

use super::HandlerDeps;

/// Generates and commits a schedule's occurrences.
pub struct CreateScheduleHandler {
    deps: HandlerDeps,
}

impl CreateScheduleHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }
}

fn schedule_error(err: ScheduleError) -> HandlerResult {
    match err {
        ScheduleError::InvalidRange { start, end } => HandlerResult::new(ResultKind::InvalidRange)
            .with("start", start.to_string())
            .with("end", end.to_string()),
        ScheduleError::InactiveMinistry { ministry } => {
            HandlerResult::new(ResultKind::InactiveMinistry).with("ministry", ministry)
        }
        ScheduleError::InvalidRecurrence { detail } => {
            HandlerResult::new(ResultKind::InvalidRecurrence).with("detail", detail)
        }
    }
}

#[async_trait]
impl IntentHandler for CreateScheduleHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::CreateSchedule
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::Ministry, Slot::Date, Slot::Recurrence]
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let entities = &request.entities;
        let (Some(name), Some(range), Some(rule)) =
            (entities.ministry(), entities.date(), entities.recurrence())
        else {
            return Err(RotaError::Handler {
                message: "create_schedule dispatched without its slots".into(),
            });
        };

        let Some(ministry) = self.deps.repository.get_ministry(name).await? else {
            return Ok(HandlerResult::new(ResultKind::MinistryNotFound).with("ministry", &name.0));
        };

        let (start, end) = (range.start(), range.end());
        let span_days = (end - start).num_days() + 1;
        if span_days > i64::from(self.deps.schedule.max_span_days) {
            return Ok(HandlerResult::new(ResultKind::InvalidRange)
                .with("start", start.to_string())
                .with("end", end.to_string())
                .with("max_span_days", self.deps.schedule.max_span_days));
        }

        let schedule_id = ScheduleId::generate();
        let occurrences = match generate(&ministry, &schedule_id, start, end, rule) {
            Ok(occurrences) => occurrences,
            Err(e) => {
                info!(ministry = %ministry.name, error = %e, "schedule rejected");
                return Ok(schedule_error(e));
            }
        };

        let day_label = rule.day_label();
        if occurrences.is_empty() {
            return Ok(HandlerResult::new(ResultKind::ScheduleEmpty)
                .with("ministry", &ministry.name)
                .with("day_label", day_label)
                .with("start", start.to_string())
                .with("end", end.to_string()));
        }

        let month = if start.year() == end.year() && start.month() == end.month() {
            start.format("%B %Y").to_string()
        } else {
            format!("{start} to {end}")
        };
        let dates: Vec<String> = occurrences.iter().map(|o| o.date().to_string()).collect();
        let schedule = Schedule {
            id: schedule_id,
            ministry_id: ministry.id.clone(),
            title: schedule_title(&ministry, start, end),
            start_date: start,
            end_date: end,
        };
        let title = schedule.title.clone();
        self.deps
            .repository
            .commit_occurrences(schedule, occurrences)
            .await?;

        Ok(HandlerResult::new(ResultKind::ScheduleCreated)
            .with("count", dates.len())
            .with("day_label", day_label)
            .with("month", month)
            .with("ministry", &ministry.name)
            .with("title", title)
            .with("dates", dates))
    }
}
