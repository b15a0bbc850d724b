// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory for Rota.
//!
//! A [`MemoryStore`] keeps, per conversation key, a fixed-size ring of the
//! most recent raw messages, the last resolved entities, and any intent
//! waiting on clarification. It also owns the per-key turn lock that
//! serializes turns within one conversation.

pub mod context;
pub mod ring;
pub mod store;

pub use context::{ConversationContext, PendingIntent, StoredMessage};
pub use ring::MessageRing;
pub use store::{MemoryStore, TurnGuard, TurnUpdate};
