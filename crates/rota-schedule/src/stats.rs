// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use rota_core::{Assignment, AssignmentStatus};
use serde::Serialize;

/// Assignment totals over a period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssignmentStats {
    pub total: usize,
    pub assigned: usize,
    pub confirmed: usize,
    pub declined: usize,
    pub completed: usize,
    pub no_show: usize,
    /// Share of all assignments currently CONFIRMED, as a percentage
    /// rounded to two decimals. Zero when there are no assignments.
    pub confirmation_rate: f64,
}

impl AssignmentStats {
    pub fn tally<'a>(assignments: impl IntoIterator<Item = &'a Assignment>) -> Self {
        let mut stats = Self::default();
        for a in assignments {
            stats.total += 1;
            match a.status {
                AssignmentStatus::Assigned => stats.assigned += 1,
                AssignmentStatus::Confirmed => stats.confirmed += 1,
                AssignmentStatus::Declined => stats.declined += 1,
                AssignmentStatus::Completed => stats.completed += 1,
                AssignmentStatus::NoShow => stats.no_show += 1,
            }
        }
        if stats.total > 0 {
            let rate = stats.confirmed as f64 / stats.total as f64 * 100.0;
            stats.confirmation_rate = (rate * 100.0).round() / 100.0;
        }
        stats
    }
}
