// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent handlers.
//!
//! Handlers turn resolved entities into repository calls and a
//! [`HandlerResult`](rota_core::HandlerResult). Business outcomes such as a
//! role conflict are results, not errors; a handler returns `Err` only when
//! a capability fails.

mod assign;
mod query;
mod reset;
mod schedule;
mod status;

use std::sync::Arc;

use chrono::NaiveDate;
use rota_config::ScheduleConfig;
use rota_core::{
    ConversationKey, DateRange, IntentHandler, Ministry, MinistryId, RepositoryAdapter, RotaError,
    UserRecord, UserRef,
};
use rota_memory::MemoryStore;

pub use assign::AssignVolunteerHandler;
pub use query::{AssignmentStatsHandler, MyAssignmentsHandler, RosterHandler};
pub use reset::ResetHandler;
pub use schedule::CreateScheduleHandler;
pub use status::StatusChangeHandler;

/// What every handler needs from the outside.
#[derive(Clone)]
pub struct HandlerDeps {
    pub repository: Arc<dyn RepositoryAdapter>,
    pub schedule: ScheduleConfig,
}

impl HandlerDeps {
    /// The named user, or the speaker when no user was mentioned.
    pub(crate) async fn user_or_speaker(
        &self,
        user: Option<&UserRef>,
        key: &ConversationKey,
    ) -> Result<(UserRef, Option<UserRecord>), RotaError> {
        let user = user.cloned().unwrap_or(UserRef::Speaker);
        let record = self.repository.find_user(&user, key).await?;
        Ok((user, record))
    }

    /// Ministry display name by id, falling back to the id itself.
    pub(crate) fn ministry_name(ministries: &[Ministry], id: &MinistryId) -> String {
        ministries
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// "on 2024-01-07" or "from 2024-01-01 to 2024-01-31".
pub(crate) fn period(range: &DateRange) -> String {
    match range.as_single() {
        Some(day) => format!("on {day}"),
        None => format!("from {} to {}", range.start(), range.end()),
    }
}

/// Inclusive `[start, end]` covered by a range, members or not.
pub(crate) fn bounds(range: &DateRange) -> (NaiveDate, NaiveDate) {
    (range.start(), range.end())
}

/// Display name for a user reference: the record's full name when known.
pub(crate) fn display_name(user: &UserRef, record: Option<&UserRecord>) -> String {
    match record {
        Some(r) => r.full_name(),
        None => user.to_string(),
    }
}

/// The standard handler set for every supported intent except the fallback.
pub fn default_handlers(
    deps: HandlerDeps,
    memory: Arc<MemoryStore>,
) -> Vec<Arc<dyn IntentHandler>> {
    vec![
        Arc::new(CreateScheduleHandler::new(deps.clone())),
        Arc::new(AssignVolunteerHandler::new(deps.clone())),
        Arc::new(MyAssignmentsHandler::new(deps.clone())),
        Arc::new(RosterHandler::new(deps.clone())),
        Arc::new(AssignmentStatsHandler::new(deps.clone())),
        Arc::new(StatusChangeHandler::confirm(deps.clone())),
        Arc::new(StatusChangeHandler::decline(deps)),
        Arc::new(ResetHandler::new(memory)),
    ]
}
