// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure scheduling rules for Rota.
//!
//! Nothing in this crate performs I/O. The generator expands a recurrence
//! rule into dated occurrences, the resolver gives an advisory verdict on an
//! assignment request, and the lifecycle module owns status transitions.
//! Repositories reuse [`occupancy`] to re-check requests at commit time.

pub mod generator;
pub mod lifecycle;
pub mod resolver;
pub mod stats;

pub use generator::{generate, schedule_title, validate_recurrence};
pub use lifecycle::apply_status;
pub use resolver::{occupancy, resolve, Occupancy};
pub use stats::AssignmentStats;
