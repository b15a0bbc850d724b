// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use rota_core::{
    AssignmentStatus, HandlerRequest, HandlerResult, IntentHandler, IntentKind, ResultKind,
    RotaError, Slot, StatusUpdate,
};
use tracing::info;

use super::{display_name, HandlerDeps};

/// Confirms or declines a user's assignment on a date.
///
/// The user defaults to the speaker. When they hold several roles that day,
/// a named role picks one; otherwise the first one that can make the
/// transition is changed.
pub struct StatusChangeHandler {
    deps: HandlerDeps,
    intent: IntentKind,
    target: AssignmentStatus,
}

impl StatusChangeHandler {
    pub fn confirm(deps: HandlerDeps) -> Self {
        Self {
            deps,
            intent: IntentKind::ConfirmAssignment,
            target: AssignmentStatus::Confirmed,
        }
    }

    pub fn decline(deps: HandlerDeps) -> Self {
        Self {
            deps,
            intent: IntentKind::DeclineAssignment,
            target: AssignmentStatus::Declined,
        }
    }
}

#[async_trait]
impl IntentHandler for StatusChangeHandler {
    fn intent(&self) -> IntentKind {
        self.intent
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::Date]
    }

    fn needs_single_date(&self) -> bool {
        true
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let Some(date) = request.entities.date().and_then(|d| d.as_single()) else {
            return Err(RotaError::Handler {
                message: format!("{} dispatched without a date", self.intent),
            });
        };
        let (user_ref, record) = self
            .deps
            .user_or_speaker(request.entities.user(), &request.key)
            .await?;
        let Some(user) = record else {
            return Ok(HandlerResult::new(ResultKind::UserNotFound).with("user", user_ref.to_string()));
        };
        let name = display_name(&user_ref, Some(&user));

        let role = request.entities.role();
        let held: Vec<_> = self
            .deps
            .repository
            .assignments_in_range(date, date, Some(&user.id))
            .await?
            .into_iter()
            .map(|(_, a)| a)
            .filter(|a| role.is_none_or(|r| a.role == r))
            .collect();

        let missing = || {
            HandlerResult::new(ResultKind::AssignmentMissing)
                .with("user", &name)
                .with("date", date.to_string())
        };
        let Some(first) = held.first() else {
            return Ok(missing());
        };
        let chosen = held
            .iter()
            .find(|a| a.status.can_transition_to(self.target))
            .unwrap_or(first);

        let update = self
            .deps
            .repository
            .update_assignment_status(&chosen.id, self.target)
            .await?;
        Ok(match update {
            StatusUpdate::Updated(a) => {
                info!(assignment = %a.id, status = %a.status, "assignment status changed");
                HandlerResult::new(ResultKind::StatusUpdated)
                    .with("user", &name)
                    .with("role", a.role.label())
                    .with("date", date.to_string())
                    .with("status", a.status.to_string().to_lowercase().replace('_', " "))
            }
            StatusUpdate::InvalidTransition { from, to } => {
                HandlerResult::new(ResultKind::StatusTransitionInvalid)
                    .with("from", from.to_string().to_lowercase().replace('_', " "))
                    .with("to", to.to_string().to_lowercase().replace('_', " "))
            }
            StatusUpdate::Conflict(holder) => {
                let holder_name = self
                    .deps
                    .repository
                    .get_user(&holder.user_id)
                    .await?
                    .map(|u| u.full_name())
                    .unwrap_or_else(|| holder.user_id.to_string());
                HandlerResult::new(ResultKind::AssignmentConflict)
                    .with("user", &name)
                    .with("holder", holder_name)
                    .with("role", holder.role.label())
                    .with("date", date.to_string())
            }
            StatusUpdate::NotFound => missing(),
        })
    }
}
