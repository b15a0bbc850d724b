// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment status transitions.

use rota_core::{Assignment, AssignmentStatus, StatusUpdate};
use tracing::debug;

/// Moves `assignment` to `next` if the lifecycle allows it.
///
/// On success the assignment is updated in place and a copy is returned in
/// [`StatusUpdate::Updated`]; otherwise it is left untouched.
pub fn apply_status(assignment: &mut Assignment, next: AssignmentStatus) -> StatusUpdate {
    let from = assignment.status;
    if !from.can_transition_to(next) {
        debug!(assignment = %assignment.id, %from, to = %next, "transition refused");
        return StatusUpdate::InvalidTransition { from, to: next };
    }
    assignment.status = next;
    StatusUpdate::Updated(assignment.clone())
}
