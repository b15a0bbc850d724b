// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent handler trait invoked by the router's dispatch table.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entities::{IntentKind, ResolvedEntities, Slot};
use crate::error::RotaError;
use crate::result::HandlerResult;
use crate::types::ConversationKey;

/// Everything a handler receives for one dispatched turn.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub key: ConversationKey,
    pub entities: ResolvedEntities,
    /// The anchor date relative expressions were resolved against.
    pub today: NaiveDate,
}

/// One handler per intent label.
///
/// Business rejections (conflicts, unavailable users, invalid ranges) are
/// returned as `Ok` results with a specific kind. `Err` is reserved for
/// capability failures and ends the turn with a system error.
#[async_trait]
pub trait IntentHandler: Send + Sync + 'static {
    fn intent(&self) -> IntentKind;

    /// Slots that must be resolved before the handler is invoked.
    fn required_slots(&self) -> &'static [Slot] {
        &[]
    }

    /// Whether the date slot must name exactly one day.
    fn needs_single_date(&self) -> bool {
        false
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError>;
}
