// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Rota core.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Stable identifier (channel + sender) scoping memory and pending-intent state.
    ConversationKey
);
string_id!(
    /// Identifier of a ministry record.
    MinistryId
);
string_id!(
    /// Identifier of a user record.
    UserId
);
string_id!(
    /// Identifier of a schedule (the template an occurrence batch belongs to).
    ScheduleId
);
string_id!(
    /// Identifier of one dated occurrence, derived from its schedule and date.
    OccurrenceId
);
string_id!(
    /// Identifier of a committed assignment.
    AssignmentId
);

impl ConversationKey {
    /// Builds a key from the transport channel name and the sender id.
    pub fn new(channel: &str, sender: &str) -> Self {
        Self(format!("{channel}:{sender}"))
    }

    /// The sender part of the key (everything after the first `:`).
    pub fn sender(&self) -> &str {
        self.0.split_once(':').map(|(_, s)| s).unwrap_or(&self.0)
    }
}

impl ScheduleId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl OccurrenceId {
    /// Occurrence ids are a pure function of schedule and date so that
    /// regeneration yields identical sequences.
    pub fn derive(schedule: &ScheduleId, date: NaiveDate) -> Self {
        Self(format!("{}:{}", schedule.0, date.format("%Y-%m-%d")))
    }
}

impl AssignmentId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of external capability behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Classifier,
    Repository,
}

// --- Channel types ---

/// A raw message delivered by the inbound transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub key: ConversationKey,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(key: ConversationKey, text: impl Into<String>) -> Self {
        Self {
            key,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A formatted reply handed to the outbound transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: ConversationKey,
    pub text: String,
}

// --- Vocabularies ---

/// Roles a volunteer can be assigned to on an occurrence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleCode {
    WorshipLead,
    SoundTech,
    Media,
    KidsTeacher,
    Greeter,
    Prayer,
    Communion,
    Offering,
    Security,
    Cleaning,
    Other,
}

impl RoleCode {
    /// Human-readable label used in replies ("worship lead").
    pub fn label(&self) -> String {
        self.to_string().to_lowercase().replace('_', " ")
    }
}

/// Lifecycle status of an assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Assigned,
    Confirmed,
    Declined,
    Completed,
    NoShow,
}

impl AssignmentStatus {
    /// Whether a move from `self` to `next` is allowed.
    ///
    /// ASSIGNED -> CONFIRMED | DECLINED, CONFIRMED -> COMPLETED | NO_SHOW,
    /// DECLINED -> ASSIGNED. COMPLETED and NO_SHOW are terminal.
    pub fn can_transition_to(self, next: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, next),
            (Assigned, Confirmed)
                | (Assigned, Declined)
                | (Confirmed, Completed)
                | (Confirmed, NoShow)
                | (Declined, Assigned)
        )
    }

    /// Declined assignments no longer occupy their role.
    pub fn is_active(self) -> bool {
        self != AssignmentStatus::Declined
    }
}

/// Full English day name ("Sunday"), the form stored on occurrences.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// --- Records read through the repository capability ---

/// A service area such as worship, sound, or kids ministry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ministry {
    pub id: MinistryId,
    pub name: String,
    pub leader: Option<UserId>,
    pub is_active: bool,
}

impl Ministry {
    pub fn can_create_schedule(&self) -> bool {
        self.is_active
    }
}

/// A church member or volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_active: bool,
    pub is_available: bool,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn can_be_scheduled(&self) -> bool {
        self.is_active && self.is_available
    }
}

/// Availability snapshot for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAvailability {
    pub user: UserRecord,
    pub unavailable_dates: BTreeSet<NaiveDate>,
}

impl UserAvailability {
    pub fn always(user: UserRecord) -> Self {
        Self {
            user,
            unavailable_dates: BTreeSet::new(),
        }
    }

    /// A user is unavailable on a date if they cannot be scheduled at all
    /// or the date is explicitly blocked.
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.user.can_be_scheduled() && !self.unavailable_dates.contains(&date)
    }
}

/// A schedule template for a period, e.g. "Worship - January 2024".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: ScheduleId,
    pub ministry_id: MinistryId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One concrete dated instance of a schedule.
///
/// The day of week is always derived from the date; there is no way to
/// construct an occurrence with an independently supplied day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScheduleOccurrence {
    id: OccurrenceId,
    schedule_id: ScheduleId,
    ministry_id: MinistryId,
    date: NaiveDate,
}

impl ScheduleOccurrence {
    pub fn new(schedule_id: ScheduleId, ministry_id: MinistryId, date: NaiveDate) -> Self {
        Self {
            id: OccurrenceId::derive(&schedule_id, date),
            schedule_id,
            ministry_id,
            date,
        }
    }

    pub fn id(&self) -> &OccurrenceId {
        &self.id
    }

    pub fn schedule_id(&self) -> &ScheduleId {
        &self.schedule_id
    }

    pub fn ministry_id(&self) -> &MinistryId {
        &self.ministry_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn day_of_week(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn day_label(&self) -> &'static str {
        weekday_name(self.day_of_week())
    }
}

/// A binding of one user to one role on one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub occurrence_id: OccurrenceId,
    pub user_id: UserId,
    pub role: RoleCode,
    pub status: AssignmentStatus,
}

/// Transient input to the assignment resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub occurrence_id: OccurrenceId,
    pub user_id: UserId,
    pub role: RoleCode,
}

impl AssignmentRequest {
    /// Materialises the request as a fresh ASSIGNED assignment.
    pub fn into_assignment(self, id: AssignmentId) -> Assignment {
        Assignment {
            id,
            occurrence_id: self.occurrence_id,
            user_id: self.user_id,
            role: self.role,
            status: AssignmentStatus::Assigned,
        }
    }
}

/// Outcome of resolving an assignment request against a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentDecision {
    /// The request may be committed under the given identity.
    Accepted(AssignmentId),
    /// The user is inactive or unavailable on the occurrence date.
    RejectedUnavailable,
    /// Another user already holds the role on this occurrence.
    RejectedConflict(Assignment),
    /// The user already holds this exact role; an idempotent no-op.
    RejectedDuplicateRole,
}

/// Result of the repository's authoritative check-and-commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Assignment),
    /// The role was taken by another user between resolution and commit.
    Conflict(Assignment),
    /// The same user already holds the role.
    Duplicate(Assignment),
}

/// Result of an assignment status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Updated(Assignment),
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    /// Reactivating a declined assignment would collide with the current
    /// holder of the role.
    Conflict(Assignment),
    NotFound,
}
