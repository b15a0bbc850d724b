// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use rota_core::{
    AssignmentDecision, AssignmentRequest, CommitOutcome, HandlerRequest, HandlerResult,
    IntentHandler, IntentKind, ResultKind, RotaError, Slot,
};
use rota_schedule::resolve;
use tracing::{debug, info};

use super::{display_name, HandlerDeps};

/// Assigns a volunteer to a role on one occurrence.
///
/// The resolver's verdict is advisory; the repository re-checks uniqueness
/// when committing and its answer is the one reported.
pub struct AssignVolunteerHandler {
    deps: HandlerDeps,
}

impl AssignVolunteerHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }

    async fn holder_name(&self, holder: &rota_core::Assignment) -> Result<String, RotaError> {
        Ok(self
            .deps
            .repository
            .get_user(&holder.user_id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_else(|| holder.user_id.to_string()))
    }
}

#[async_trait]
impl IntentHandler for AssignVolunteerHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::AssignVolunteer
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::User, Slot::Date, Slot::Role]
    }

    fn needs_single_date(&self) -> bool {
        true
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        let entities = &request.entities;
        let (Some(user_ref), Some(date), Some(role)) = (
            entities.user(),
            entities.date().and_then(|d| d.as_single()),
            entities.role(),
        ) else {
            return Err(RotaError::Handler {
                message: "assign_volunteer dispatched without its slots".into(),
            });
        };
        let repo = &self.deps.repository;

        let Some(user) = repo.find_user(user_ref, &request.key).await? else {
            return Ok(HandlerResult::new(ResultKind::UserNotFound).with("user", user_ref.to_string()));
        };
        let user_name = display_name(user_ref, Some(&user));

        let ministry = match entities.ministry() {
            Some(name) => match repo.get_ministry(name).await? {
                Some(m) => Some(m),
                None => {
                    return Ok(HandlerResult::new(ResultKind::MinistryNotFound).with("ministry", &name.0));
                }
            },
            None => None,
        };

        let occurrences = repo
            .find_occurrences(date, ministry.as_ref().map(|m| &m.id))
            .await?;
        let occurrence = match occurrences.as_slice() {
            [] => {
                let mut result =
                    HandlerResult::new(ResultKind::OccurrenceNotFound).with("date", date.to_string());
                if let Some(m) = &ministry {
                    result = result.with("ministry", &m.name);
                }
                return Ok(result);
            }
            [only] => only.clone(),
            many => {
                let all = repo.list_ministries().await?;
                let names: Vec<String> = many
                    .iter()
                    .map(|o| HandlerDeps::ministry_name(&all, o.ministry_id()))
                    .collect();
                return Ok(HandlerResult::new(ResultKind::OccurrenceAmbiguous)
                    .with("date", date.to_string())
                    .with("ministries", names));
            }
        };
        let ministry_name = match ministry {
            Some(m) => m.name,
            None => HandlerDeps::ministry_name(&repo.list_ministries().await?, occurrence.ministry_id()),
        };

        let Some(availability) = repo.get_user_availability(&user.id).await? else {
            return Ok(HandlerResult::new(ResultKind::UserNotFound).with("user", &user_name));
        };
        let existing = repo.get_existing_assignments(occurrence.id()).await?;
        let assignment = AssignmentRequest {
            occurrence_id: occurrence.id().clone(),
            user_id: user.id.clone(),
            role,
        };

        let base = |kind: ResultKind| {
            HandlerResult::new(kind)
                .with("user", &user_name)
                .with("role", role.label())
                .with("date", date.to_string())
        };

        match resolve(&assignment, &existing, &availability, date) {
            AssignmentDecision::RejectedUnavailable => Ok(base(ResultKind::AssignmentUnavailable)),
            AssignmentDecision::RejectedDuplicateRole => Ok(base(ResultKind::AssignmentDuplicate)),
            AssignmentDecision::RejectedConflict(holder) => {
                let holder = self.holder_name(&holder).await?;
                Ok(base(ResultKind::AssignmentConflict).with("holder", holder))
            }
            AssignmentDecision::Accepted(id) => match repo.commit_assignment(assignment, id).await? {
                CommitOutcome::Committed(a) => {
                    info!(assignment = %a.id, user = %a.user_id, role = %a.role, %date, "volunteer assigned");
                    Ok(base(ResultKind::AssignmentAccepted)
                        .with("ministry", &ministry_name)
                        .with("day_label", occurrence.day_label()))
                }
                CommitOutcome::Duplicate(_) => Ok(base(ResultKind::AssignmentDuplicate)),
                CommitOutcome::Conflict(holder) => {
                    debug!(occurrence = %occurrence.id(), "role taken between resolve and commit");
                    let holder = self.holder_name(&holder).await?;
                    Ok(base(ResultKind::AssignmentConflict).with("holder", holder))
                }
            },
        }
    }
}
