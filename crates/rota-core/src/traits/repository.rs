// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository capability: typed reads and the authoritative commits.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{MinistryRef, UserRef};
use crate::error::RotaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Assignment, AssignmentId, AssignmentRequest, AssignmentStatus, CommitOutcome,
    ConversationKey, Ministry, MinistryId, OccurrenceId, Schedule, ScheduleOccurrence,
    StatusUpdate, UserAvailability, UserId, UserRecord,
};

/// Data access for ministries, users, occurrences, and assignments.
///
/// Implementations must make [`commit_assignment`](Self::commit_assignment)
/// atomic: the uniqueness of a non-declined (occurrence, role) holder is
/// re-checked against committed state in the same critical section that
/// writes the assignment.
#[async_trait]
pub trait RepositoryAdapter: PluginAdapter {
    async fn list_ministries(&self) -> Result<Vec<Ministry>, RotaError>;

    /// Looks a ministry up by name, case-insensitively.
    async fn get_ministry(&self, name: &MinistryRef) -> Result<Option<Ministry>, RotaError>;

    /// Resolves a user reference. `UserRef::Speaker` is matched against the
    /// sender part of the conversation key.
    async fn find_user(
        &self,
        user: &UserRef,
        speaker: &ConversationKey,
    ) -> Result<Option<UserRecord>, RotaError>;

    async fn get_user(&self, id: &UserId) -> Result<Option<UserRecord>, RotaError>;

    async fn get_user_availability(&self, id: &UserId)
    -> Result<Option<UserAvailability>, RotaError>;

    /// Stores a schedule and its occurrences in one step.
    async fn commit_occurrences(
        &self,
        schedule: Schedule,
        occurrences: Vec<ScheduleOccurrence>,
    ) -> Result<(), RotaError>;

    async fn find_occurrences(
        &self,
        date: NaiveDate,
        ministry: Option<&MinistryId>,
    ) -> Result<Vec<ScheduleOccurrence>, RotaError>;

    async fn get_existing_assignments(
        &self,
        occurrence: &OccurrenceId,
    ) -> Result<Vec<Assignment>, RotaError>;

    /// Atomic check-and-commit of an accepted request.
    async fn commit_assignment(
        &self,
        request: AssignmentRequest,
        id: AssignmentId,
    ) -> Result<CommitOutcome, RotaError>;

    /// Assignments whose occurrence falls in `[start, end]`, optionally for one
    /// user, ordered by occurrence date.
    async fn assignments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        user: Option<&UserId>,
    ) -> Result<Vec<(ScheduleOccurrence, Assignment)>, RotaError>;

    async fn update_assignment_status(
        &self,
        id: &AssignmentId,
        status: AssignmentStatus,
    ) -> Result<StatusUpdate, RotaError>;
}
