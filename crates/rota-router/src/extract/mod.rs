// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Independent slot extractors run over a single message.
//!
//! Each extractor either yields a typed value or nothing. None of them look
//! at conversation history; that is the resolver's job.

pub mod dates;
pub mod ministries;
pub mod people;
pub mod recurrence;
pub mod roles;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rota_core::{ResolvedEntities, Slot, SlotSource, SlotValue};

pub use dates::{extract_dates, extract_ordinal, Ordinal};
pub use ministries::extract_ministry;
pub use people::{extract_person, PersonMention};
pub use recurrence::extract_recurrence;
pub use roles::extract_role;

/// Slots found in one message, plus slots the message explicitly left open.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entities: ResolvedEntities,
    /// Slots the message marks as unknown ("someone"); these must not be
    /// back-filled from history.
    pub blocked: BTreeSet<Slot>,
}

/// Runs every extractor over `text`.
///
/// `expecting` lists slots the user is answering a prompt for; extractors
/// loosen their rules for those.
pub fn extract(text: &str, today: NaiveDate, ministries: &[String], expecting: &[Slot]) -> Extraction {
    let lower = text.to_lowercase();
    let mut out = Extraction::default();
    let source = SlotSource::Message;

    match extract_person(text, ministries, expecting.contains(&Slot::User)) {
        Some(PersonMention::Found(user)) => out.entities.insert(SlotValue::User(user), source),
        Some(PersonMention::Placeholder) => {
            out.blocked.insert(Slot::User);
        }
        None => {}
    }
    if let Some(range) = extract_dates(&lower, today) {
        out.entities.insert(SlotValue::Date(range), source);
    }
    if let Some(role) = extract_role(&lower) {
        out.entities.insert(SlotValue::Role(role), source);
    }
    if let Some(ministry) = extract_ministry(&lower, ministries) {
        out.entities.insert(SlotValue::Ministry(ministry), source);
    }
    if let Some(rule) = extract_recurrence(&lower) {
        out.entities.insert(SlotValue::Recurrence(rule), source);
    }
    out
}
