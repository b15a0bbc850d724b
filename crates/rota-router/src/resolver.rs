// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity resolution: message extraction with memory fallback.
//!
//! Precedence per slot, highest first:
//! 1. a value extracted from the current message (including ordinal
//!    references like "the first one" resolved against the remembered range);
//! 2. the conversation's last resolved value;
//! 3. the most recent of the last few raw messages that mentions the slot.
//!
//! A slot the message explicitly leaves open ("someone") skips 2 and 3.

use chrono::{Days, NaiveDate};
use rota_core::{DateRange, ResolvedEntities, Slot, SlotSource, SlotValue};
use rota_memory::ConversationContext;
use tracing::trace;

use crate::extract::{self, Extraction};

/// Resolves slot values for one turn.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    recency_window: usize,
}

impl EntityResolver {
    pub fn new(recency_window: usize) -> Self {
        Self { recency_window }
    }

    pub fn recency_window(&self) -> usize {
        self.recency_window
    }

    /// Resolves `message` against `context`.
    ///
    /// `context.messages` is expected to already contain `message` as its
    /// latest entry; that entry is skipped when searching history.
    pub fn resolve(
        &self,
        message: &str,
        context: &ConversationContext,
        today: NaiveDate,
        ministries: &[String],
    ) -> ResolvedEntities {
        self.resolve_expecting(message, context, today, ministries, &[])
    }

    /// Like [`resolve`](Self::resolve), for a reply to a clarification prompt
    /// asking for `expecting`.
    pub fn resolve_expecting(
        &self,
        message: &str,
        context: &ConversationContext,
        today: NaiveDate,
        ministries: &[String],
        expecting: &[Slot],
    ) -> ResolvedEntities {
        let Extraction {
            entities: mut resolved,
            blocked,
        } = extract::extract(message, today, ministries, expecting);

        if !resolved.contains(Slot::Date)
            && let Some(date) = self.ordinal_date(message, context)
        {
            resolved.insert(SlotValue::Date(DateRange::single(date)), SlotSource::Message);
        }

        for (value, _) in context.last_resolved.iter() {
            let slot = value.slot();
            if !resolved.contains(slot) && !blocked.contains(&slot) {
                resolved.insert(value.clone(), SlotSource::Memory);
            }
        }

        for (text, anchor) in self.history(context, today) {
            let past = extract::extract(&text, anchor, ministries, &[]);
            for (value, _) in past.entities.iter() {
                let slot = value.slot();
                if !resolved.contains(slot) && !blocked.contains(&slot) {
                    trace!(slot = %slot, "slot filled from recent history");
                    resolved.insert(value.clone(), SlotSource::History);
                }
            }
        }

        resolved
    }

    /// "the first one" picks from the most recently resolved date range.
    fn ordinal_date(&self, message: &str, context: &ConversationContext) -> Option<NaiveDate> {
        let ordinal = extract::extract_ordinal(&message.to_lowercase())?;
        ordinal.pick(context.last_resolved.date()?)
    }

    /// Prior messages inside the recency window, newest first, each paired
    /// with the day it was sent so relative terms keep their original meaning.
    fn history(&self, context: &ConversationContext, today: NaiveDate) -> Vec<(String, NaiveDate)> {
        let Some(current) = context.messages.latest() else {
            return Vec::new();
        };
        let current_day = current.received_at.date_naive();
        let mut recent: Vec<_> = context
            .messages
            .recent(self.recency_window + 1)
            .collect();
        recent.pop();
        recent
            .into_iter()
            .rev()
            .map(|m| {
                let days_ago = (current_day - m.received_at.date_naive()).num_days().max(0);
                let anchor = today
                    .checked_sub_days(Days::new(days_ago.unsigned_abs()))
                    .unwrap_or(today);
                (m.text.clone(), anchor)
            })
            .collect()
    }
}
