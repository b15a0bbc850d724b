// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only handlers: a user's assignments, rosters, and statistics.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Days;
use rota_core::{
    Assignment, HandlerRequest, HandlerResult, IntentHandler, IntentKind, Ministry, ResultKind,
    RotaError, ScheduleOccurrence, Slot, UserId,
};
use rota_schedule::AssignmentStats;
use serde::Serialize;

use super::{bounds, display_name, period, HandlerDeps};

#[derive(Serialize)]
struct AssignmentItem {
    date: String,
    day_label: &'static str,
    ministry: String,
    role: String,
    status: String,
}

#[derive(Serialize)]
struct RosterItem {
    date: String,
    ministry: String,
    role: String,
    user: String,
    status: String,
}

/// Keeps rows whose occurrence belongs to `ministry`, when one was named.
fn in_ministry(
    rows: Vec<(ScheduleOccurrence, Assignment)>,
    ministry: Option<&Ministry>,
) -> Vec<(ScheduleOccurrence, Assignment)> {
    match ministry {
        Some(m) => rows.into_iter().filter(|(o, _)| o.ministry_id() == &m.id).collect(),
        None => rows,
    }
}

/// Resolves the optional ministry slot. `Err` carries the not-found result.
async fn optional_ministry(
    deps: &HandlerDeps,
    request: &HandlerRequest,
) -> Result<Result<Option<Ministry>, HandlerResult>, RotaError> {
    match request.entities.ministry() {
        None => Ok(Ok(None)),
        Some(name) => Ok(match deps.repository.get_ministry(name).await? {
            Some(m) => Ok(Some(m)),
            None => Err(HandlerResult::new(ResultKind::MinistryNotFound).with("ministry", &name.0)),
        }),
    }
}

/// Lists one user's assignments, upcoming by default.
pub struct MyAssignmentsHandler {
    deps: HandlerDeps,
}

impl MyAssignmentsHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl IntentHandler for MyAssignmentsHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::MyAssignments
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let (user_ref, record) = self
            .deps
            .user_or_speaker(request.entities.user(), &request.key)
            .await?;
        let Some(user) = record else {
            return Ok(HandlerResult::new(ResultKind::UserNotFound).with("user", user_ref.to_string()));
        };
        let name = display_name(&user_ref, Some(&user));

        let (start, end) = match request.entities.date() {
            Some(range) => bounds(range),
            None => {
                let end = request
                    .today
                    .checked_add_days(Days::new(u64::from(self.deps.schedule.upcoming_days)))
                    .unwrap_or(request.today);
                (request.today, end)
            }
        };

        let rows = self
            .deps
            .repository
            .assignments_in_range(start, end, Some(&user.id))
            .await?;
        if rows.is_empty() {
            return Ok(HandlerResult::new(ResultKind::AssignmentListEmpty)
                .with("user", &name)
                .with("start", start.to_string())
                .with("end", end.to_string()));
        }

        let ministries = self.deps.repository.list_ministries().await?;
        let items: Vec<AssignmentItem> = rows
            .iter()
            .map(|(o, a)| AssignmentItem {
                date: o.date().to_string(),
                day_label: o.day_label(),
                ministry: HandlerDeps::ministry_name(&ministries, o.ministry_id()),
                role: a.role.label(),
                status: a.status.to_string(),
            })
            .collect();
        Ok(HandlerResult::new(ResultKind::AssignmentList)
            .with("user", &name)
            .with("count", items.len())
            .with("items", items))
    }
}

/// Who is serving on a date or over a range, optionally for one ministry.
pub struct RosterHandler {
    deps: HandlerDeps,
}

impl RosterHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl IntentHandler for RosterHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::Roster
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::Date]
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let Some(range) = request.entities.date() else {
            return Err(RotaError::Handler {
                message: "roster dispatched without a date".into(),
            });
        };
        let ministry = match optional_ministry(&self.deps, &request).await? {
            Ok(m) => m,
            Err(not_found) => return Ok(not_found),
        };
        let mut when = period(range);
        if let Some(m) = &ministry {
            when = format!("for {} {when}", m.name);
        }

        let (start, end) = bounds(range);
        let rows = self.deps.repository.assignments_in_range(start, end, None).await?;
        let rows: Vec<_> = in_ministry(rows, ministry.as_ref())
            .into_iter()
            .filter(|(o, a)| a.status.is_active() && range.contains(o.date()))
            .collect();
        if rows.is_empty() {
            return Ok(HandlerResult::new(ResultKind::RosterEmpty).with("period", when));
        }

        let ministries = self.deps.repository.list_ministries().await?;
        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut items = Vec::with_capacity(rows.len());
        for (o, a) in &rows {
            if !names.contains_key(&a.user_id) {
                let name = self
                    .deps
                    .repository
                    .get_user(&a.user_id)
                    .await?
                    .map(|u| u.full_name())
                    .unwrap_or_else(|| a.user_id.to_string());
                names.insert(a.user_id.clone(), name);
            }
            items.push(RosterItem {
                date: o.date().to_string(),
                ministry: HandlerDeps::ministry_name(&ministries, o.ministry_id()),
                role: a.role.label(),
                user: names.get(&a.user_id).cloned().unwrap_or_default(),
                status: a.status.to_string(),
            });
        }
        Ok(HandlerResult::new(ResultKind::Roster)
            .with("period", when)
            .with("count", items.len())
            .with("items", items))
    }
}

/// Totals by status and the confirmation rate over a range.
pub struct AssignmentStatsHandler {
    deps: HandlerDeps,
}

impl AssignmentStatsHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl IntentHandler for AssignmentStatsHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::AssignmentStats
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::Date]
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let Some(range) = request.entities.date() else {
            return Err(RotaError::Handler {
                message: "assignment_stats dispatched without a date".into(),
            });
        };
        let ministry = match optional_ministry(&self.deps, &request).await? {
            Ok(m) => m,
            Err(not_found) => return Ok(not_found),
        };
        let (start, end) = bounds(range);
        let rows = in_ministry(
            self.deps.repository.assignments_in_range(start, end, None).await?,
            ministry.as_ref(),
        );
        let stats = AssignmentStats::tally(rows.iter().map(|(_, a)| a));

        let mut result = HandlerResult::new(ResultKind::Stats)
            .with("start", start.to_string())
            .with("end", end.to_string())
            .with("total", stats.total)
            .with("assigned", stats.assigned)
            .with("confirmed", stats.confirmed)
            .with("declined", stats.declined)
            .with("completed", stats.completed)
            .with("no_show", stats.no_show)
            .with("confirmation_rate", stats.confirmation_rate);
        if let Some(m) = ministry {
            result = result.with("ministry", m.name);
        }
        Ok(result)
    }
}
