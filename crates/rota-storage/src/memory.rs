// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the RepositoryAdapter trait.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, info};

use rota_core::{
    AdapterType, Assignment, AssignmentId, AssignmentRequest, AssignmentStatus, CommitOutcome,
    ConversationKey, HealthStatus, Ministry, MinistryId, MinistryRef, OccurrenceId,
    PluginAdapter, RepositoryAdapter, RotaError, Schedule, ScheduleId, ScheduleOccurrence,
    StatusUpdate, UserAvailability, UserId, UserRecord, UserRef,
};
use rota_schedule::{Occupancy, apply_status, occupancy};

#[derive(Debug, Default)]
struct State {
    ministries: BTreeMap<MinistryId, Ministry>,
    users: BTreeMap<UserId, UserRecord>,
    unavailable: HashMap<UserId, BTreeSet<NaiveDate>>,
    schedules: BTreeMap<ScheduleId, Schedule>,
    occurrences: BTreeMap<OccurrenceId, ScheduleOccurrence>,
    /// Commit order is preserved.
    assignments: Vec<Assignment>,
}

impl State {
    fn assignments_for(&self, occurrence: &OccurrenceId) -> Vec<Assignment> {
        self.assignments
            .iter()
            .filter(|a| &a.occurrence_id == occurrence)
            .cloned()
            .collect()
    }
}

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Repository that keeps every record in process memory.
///
/// A single [`RwLock`] guards all state. Reads share it; commits take it
/// exclusively, which makes each check-and-commit atomic with respect to
/// every other commit.
#[derive(Debug)]
pub struct InMemoryRepository {
    state: RwLock<State>,
    latency: Option<Duration>,
}

/// Builder for [`InMemoryRepository`].
#[derive(Default)]
pub struct InMemoryRepositoryBuilder {
    state: State,
    latency: Option<Duration>,
}

impl InMemoryRepositoryBuilder {
    pub fn ministry(mut self, ministry: Ministry) -> Self {
        self.state.ministries.insert(ministry.id.clone(), ministry);
        self
    }

    pub fn user(mut self, user: UserRecord) -> Self {
        self.state.users.insert(user.id.clone(), user);
        self
    }

    /// Marks `user` as unable to serve on `date`.
    pub fn unavailable(mut self, user: &UserId, date: NaiveDate) -> Self {
        self.state
            .unavailable
            .entry(user.clone())
            .or_default()
            .insert(date);
        self
    }

    /// Delays every call by `latency`, to exercise caller timeouts.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn build(self) -> InMemoryRepository {
        info!(
            ministries = self.state.ministries.len(),
            users = self.state.users.len(),
            "in-memory repository ready"
        );
        InMemoryRepository {
            state: RwLock::new(self.state),
            latency: self.latency,
        }
    }
}

impl InMemoryRepository {
    pub fn builder() -> InMemoryRepositoryBuilder {
        InMemoryRepositoryBuilder::default()
    }

    /// An empty repository.
    pub fn new() -> Self {
        Self::builder().build()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// All committed assignments in commit order.
    pub async fn all_assignments(&self) -> Vec<Assignment> {
        self.state.read().await.assignments.clone()
    }

    pub async fn schedule_count(&self) -> usize {
        self.state.read().await.schedules.len()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Repository
    }

    async fn health_check(&self) -> Result<HealthStatus, RotaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RotaError> {
        let state = self.state.read().await;
        debug!(
            schedules = state.schedules.len(),
            assignments = state.assignments.len(),
            "in-memory repository shut down"
        );
        Ok(())
    }
}

#[async_trait]
impl RepositoryAdapter for InMemoryRepository {
    async fn list_ministries(&self) -> Result<Vec<Ministry>, RotaError> {
        self.delay().await;
        Ok(self.state.read().await.ministries.values().cloned().collect())
    }

    async fn get_ministry(&self, name: &MinistryRef) -> Result<Option<Ministry>, RotaError> {
        self.delay().await;
        let state = self.state.read().await;
        Ok(state
            .ministries
            .values()
            .find(|m| m.name.eq_ignore_ascii_case(&name.0) || m.id.as_str() == name.0)
            .cloned())
    }

    async fn find_user(
        &self,
        user: &UserRef,
        speaker: &ConversationKey,
    ) -> Result<Option<UserRecord>, RotaError> {
        self.delay().await;
        let state = self.state.read().await;
        match user {
            UserRef::Speaker => {
                let sender = speaker.sender();
                let sender_digits = digits(sender);
                Ok(state
                    .users
                    .values()
                    .find(|u| {
                        u.id.as_str() == sender
                            || (!sender_digits.is_empty() && digits(&u.phone_number) == sender_digits)
                    })
                    .cloned())
            }
            UserRef::Named(name) => {
                if let Some(u) = state
                    .users
                    .values()
                    .find(|u| u.full_name().eq_ignore_ascii_case(name))
                {
                    return Ok(Some(u.clone()));
                }
                let by_first: Vec<&UserRecord> = state
                    .users
                    .values()
                    .filter(|u| u.first_name.eq_ignore_ascii_case(name))
                    .collect();
                match by_first.as_slice() {
                    [only] => Ok(Some((*only).clone())),
                    [] => Ok(None),
                    many => {
                        debug!(name = %name, matches = many.len(), "ambiguous first name");
                        Ok(None)
                    }
                }
            }
        }
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, RotaError> {
        self.delay().await;
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn get_user_availability(
        &self,
        id: &UserId,
    ) -> Result<Option<UserAvailability>, RotaError> {
        self.delay().await;
        let state = self.state.read().await;
        Ok(state.users.get(id).map(|user| UserAvailability {
            user: user.clone(),
            unavailable_dates: state.unavailable.get(id).cloned().unwrap_or_default(),
        }))
    }

    async fn commit_occurrences(
        &self,
        schedule: Schedule,
        occurrences: Vec<ScheduleOccurrence>,
    ) -> Result<(), RotaError> {
        self.delay().await;
        let mut state = self.state.write().await;
        if !state.ministries.contains_key(&schedule.ministry_id) {
            return Err(RotaError::repository(format!(
                "unknown ministry `{}`",
                schedule.ministry_id
            )));
        }
        if let Some(stray) = occurrences.iter().find(|o| o.schedule_id() != &schedule.id) {
            return Err(RotaError::repository(format!(
                "occurrence `{}` does not belong to schedule `{}`",
                stray.id(),
                schedule.id
            )));
        }
        info!(
            schedule = %schedule.id,
            title = %schedule.title,
            count = occurrences.len(),
            "schedule committed"
        );
        for occurrence in occurrences {
            state.occurrences.insert(occurrence.id().clone(), occurrence);
        }
        state.schedules.insert(schedule.id.clone(), schedule);
        Ok(())
    }

    async fn find_occurrences(
        &self,
        date: NaiveDate,
        ministry: Option<&MinistryId>,
    ) -> Result<Vec<ScheduleOccurrence>, RotaError> {
        self.delay().await;
        let state = self.state.read().await;
        let mut found: Vec<ScheduleOccurrence> = state
            .occurrences
            .values()
            .filter(|o| o.date() == date && ministry.is_none_or(|m| o.ministry_id() == m))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.ministry_id().cmp(b.ministry_id()).then(a.id().cmp(b.id())));
        Ok(found)
    }

    async fn get_existing_assignments(
        &self,
        occurrence: &OccurrenceId,
    ) -> Result<Vec<Assignment>, RotaError> {
        self.delay().await;
        Ok(self.state.read().await.assignments_for(occurrence))
    }

    async fn commit_assignment(
        &self,
        request: AssignmentRequest,
        id: AssignmentId,
    ) -> Result<CommitOutcome, RotaError> {
        self.delay().await;
        let mut state = self.state.write().await;
        if !state.occurrences.contains_key(&request.occurrence_id) {
            return Err(RotaError::repository(format!(
                "unknown occurrence `{}`",
                request.occurrence_id
            )));
        }
        let existing = state.assignments_for(&request.occurrence_id);
        match occupancy(&request, &existing) {
            Some(Occupancy::Conflict(holder)) => {
                debug!(occurrence = %request.occurrence_id, role = %request.role, "commit lost the race");
                Ok(CommitOutcome::Conflict(holder.clone()))
            }
            Some(Occupancy::Duplicate(own)) => Ok(CommitOutcome::Duplicate(own.clone())),
            None => {
                let assignment = request.into_assignment(id);
                info!(
                    assignment = %assignment.id,
                    occurrence = %assignment.occurrence_id,
                    user = %assignment.user_id,
                    role = %assignment.role,
                    "assignment committed"
                );
                state.assignments.push(assignment.clone());
                Ok(CommitOutcome::Committed(assignment))
            }
        }
    }

    async fn assignments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user: Option<&UserId>,
    ) -> Result<Vec<(ScheduleOccurrence, Assignment)>, RotaError> {
        self.delay().await;
        let state = self.state.read().await;
        let mut rows: Vec<(ScheduleOccurrence, Assignment)> = state
            .assignments
            .iter()
            .filter(|a| user.is_none_or(|u| &a.user_id == u))
            .filter_map(|a| {
                let occurrence = state.occurrences.get(&a.occurrence_id)?;
                (occurrence.date() >= start && occurrence.date() <= end)
                    .then(|| (occurrence.clone(), a.clone()))
            })
            .collect();
        rows.sort_by(|(oa, aa), (ob, ab)| {
            oa.date()
                .cmp(&ob.date())
                .then(oa.ministry_id().cmp(ob.ministry_id()))
                .then(aa.role.cmp(&ab.role))
        });
        Ok(rows)
    }

    async fn update_assignment_status(
        &self,
        id: &AssignmentId,
        status: AssignmentStatus,
    ) -> Result<StatusUpdate, RotaError> {
        self.delay().await;
        let mut state = self.state.write().await;
        let Some(index) = state.assignments.iter().position(|a| &a.id == id) else {
            return Ok(StatusUpdate::NotFound);
        };

        let current = &state.assignments[index];
        if status.is_active() && !current.status.is_active() {
            let request = AssignmentRequest {
                occurrence_id: current.occurrence_id.clone(),
                user_id: current.user_id.clone(),
                role: current.role,
            };
            let others: Vec<Assignment> = state
                .assignments
                .iter()
                .filter(|a| &a.id != id)
                .cloned()
                .collect();
            if let Some(Occupancy::Conflict(holder) | Occupancy::Duplicate(holder)) =
                occupancy(&request, &others)
            {
                return Ok(StatusUpdate::Conflict(holder.clone()));
            }
        }

        let update = apply_status(&mut state.assignments[index], status);
        if let StatusUpdate::Updated(a) = &update {
            info!(assignment = %a.id, status = %a.status, "assignment status updated");
        }
        Ok(update)
    }
}
