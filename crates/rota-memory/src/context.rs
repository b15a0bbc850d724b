// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation context snapshot.

use chrono::{DateTime, Utc};
use rota_core::{ConversationKey, IntentKind, ResolvedEntities, Slot};

use crate::ring::MessageRing;

/// One raw inbound message as remembered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// An intent waiting on the user to supply missing slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingIntent {
    pub intent: IntentKind,
    pub missing: Vec<Slot>,
    /// Slots already resolved when the clarification was asked.
    pub entities: ResolvedEntities,
}

/// What the store knows about one conversation.
///
/// Handed out as an owned clone; mutating a snapshot never touches the store.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub key: ConversationKey,
    pub messages: MessageRing<StoredMessage>,
    pub last_resolved: ResolvedEntities,
    pub pending_intent: Option<PendingIntent>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ConversationContext {
    pub fn empty(key: ConversationKey, capacity: usize) -> Self {
        Self {
            key,
            messages: MessageRing::with_capacity(capacity),
            last_resolved: ResolvedEntities::new(),
            pending_intent: None,
            last_activity: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.last_resolved.is_empty() && self.pending_intent.is_none()
    }

    /// Message texts oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.messages.iter().map(|m| m.text.clone()).collect()
    }

    /// The `n` most recent message texts, oldest first.
    pub fn recent_texts(&self, n: usize) -> Vec<String> {
        self.messages.recent(n).map(|m| m.text.clone()).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.last_resolved = ResolvedEntities::new();
        self.pending_intent = None;
        self.last_activity = None;
    }
}
