// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment resolver.
//!
//! The verdict is advisory. A repository must re-run [`occupancy`] against
//! committed state inside its commit critical section.

use chrono::NaiveDate;
use rota_core::{Assignment, AssignmentDecision, AssignmentId, AssignmentRequest, UserAvailability};
use tracing::debug;

/// Who already occupies the requested (occurrence, role) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy<'a> {
    /// A different user holds the role.
    Conflict(&'a Assignment),
    /// The requesting user already holds the role.
    Duplicate(&'a Assignment),
}

/// Finds the active holder of the request's role on its occurrence.
///
/// Declined assignments are ignored. When the same role somehow has both a
/// foreign and an own entry, the foreign holder is reported.
pub fn occupancy<'a>(request: &AssignmentRequest, existing: &'a [Assignment]) -> Option<Occupancy<'a>> {
    let mut own = None;
    for a in existing.iter().filter(|a| {
        a.occurrence_id == request.occurrence_id && a.role == request.role && a.status.is_active()
    }) {
        if a.user_id != request.user_id {
            return Some(Occupancy::Conflict(a));
        }
        own.get_or_insert(a);
    }
    own.map(Occupancy::Duplicate)
}

/// Decides an assignment request against a snapshot of the occurrence's
/// assignments and the user's availability on `date`.
///
/// Policy order: unavailable, conflict, duplicate, accepted.
pub fn resolve(
    request: &AssignmentRequest,
    existing: &[Assignment],
    availability: &UserAvailability,
    date: NaiveDate,
) -> AssignmentDecision {
    if !availability.is_available_on(date) {
        debug!(user = %request.user_id, %date, "user unavailable");
        return AssignmentDecision::RejectedUnavailable;
    }
    match occupancy(request, existing) {
        Some(Occupancy::Conflict(holder)) => {
            debug!(
                occurrence = %request.occurrence_id,
                role = %request.role,
                holder = %holder.user_id,
                "role already taken"
            );
            AssignmentDecision::RejectedConflict(holder.clone())
        }
        Some(Occupancy::Duplicate(_)) => AssignmentDecision::RejectedDuplicateRole,
        None => AssignmentDecision::Accepted(AssignmentId::generate()),
    }
}

#[cfg(test)]
mod tests {
    use rota_core::{AssignmentStatus, OccurrenceId, RoleCode, UserId, UserRecord};

    use super::*;

    fn user(id: &str) -> UserRecord {
        UserRecord {
            id: UserId::from(id),
            first_name: id.into(),
            last_name: "Test".into(),
            phone_number: format!("55{id}"),
            is_active: true,
            is_available: true,
        }
    }

    fn held(user: &str, role: RoleCode, status: AssignmentStatus) -> Assignment {
        Assignment {
            id: AssignmentId::from(format!("a-{user}").as_str()),
            occurrence_id: OccurrenceId::from("s:2024-01-07"),
            user_id: UserId::from(user),
            role,
            status,
        }
    }

    fn request(user: &str, role: RoleCode) -> AssignmentRequest {
        AssignmentRequest {
            occurrence_id: OccurrenceId::from("s:2024-01-07"),
            user_id: UserId::from(user),
            role,
        }
    }

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
    }

    #[test]
    fn unavailable_wins_over_conflict() {
        let existing = vec![held("john", RoleCode::WorshipLead, AssignmentStatus::Assigned)];
        let mut avail = UserAvailability::always(user("maria"));
        avail.unavailable_dates.insert(sunday());
        assert_eq!(
            resolve(&request("maria", RoleCode::WorshipLead), &existing, &avail, sunday()),
            AssignmentDecision::RejectedUnavailable
        );
    }

    #[test]
    fn declined_holder_frees_the_role() {
        let existing = vec![held("john", RoleCode::WorshipLead, AssignmentStatus::Declined)];
        let avail = UserAvailability::always(user("maria"));
        assert!(matches!(
            resolve(&request("maria", RoleCode::WorshipLead), &existing, &avail, sunday()),
            AssignmentDecision::Accepted(_)
        ));
    }

    #[test]
    fn other_roles_do_not_collide() {
        let existing = vec![held("john", RoleCode::SoundTech, AssignmentStatus::Confirmed)];
        assert_eq!(occupancy(&request("maria", RoleCode::WorshipLead), &existing), None);
    }

    #[test]
    fn foreign_holder_reported_before_own_entry() {
        let existing = vec![
            held("maria", RoleCode::Media, AssignmentStatus::Assigned),
            held("john", RoleCode::Media, AssignmentStatus::Assigned),
        ];
        assert!(matches!(
            occupancy(&request("maria", RoleCode::Media), &existing),
            Some(Occupancy::Conflict(a)) if a.user_id.as_str() == "john"
        ));
    }
}
