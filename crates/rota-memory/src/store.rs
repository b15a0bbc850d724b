// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sharded per-key conversation store.
//!
//! Each conversation key owns a slot with two locks: a turn lock held for the
//! whole duration of a turn (serializing turns within one conversation), and a
//! short-lived state lock guarding the context itself. Different keys never
//! contend with each other beyond the dashmap shard lookup.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rota_config::MemoryConfig;
use rota_core::{Clock, ConversationKey, ResolvedEntities};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::context::{ConversationContext, PendingIntent, StoredMessage};

struct SlotState {
    context: ConversationContext,
    /// Bumped on every explicit reset; turns that began under an older
    /// generation are not merged back.
    generation: u64,
}

struct ConversationSlot {
    turn_lock: Arc<Mutex<()>>,
    state: Mutex<SlotState>,
}

/// Exclusive right to process one turn for a conversation key.
///
/// Dropping the guard releases the key for the next turn.
pub struct TurnGuard {
    key: ConversationKey,
    generation: u64,
    slot: Arc<ConversationSlot>,
    _permit: OwnedMutexGuard<()>,
}

impl TurnGuard {
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }
}

/// What a finished turn writes back into its conversation.
#[derive(Debug, Clone, Default)]
pub struct TurnUpdate {
    /// Slots resolved this turn; they overwrite remembered values.
    pub entities: ResolvedEntities,
    /// Replaces any previous pending intent.
    pub pending: Option<PendingIntent>,
}

/// Bounded conversation memory keyed by conversation.
pub struct MemoryStore {
    slots: DashMap<ConversationKey, Arc<ConversationSlot>>,
    capacity: usize,
    idle_timeout: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(capacity: usize, idle_timeout: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: DashMap::new(),
            capacity: capacity.max(1),
            idle_timeout,
            clock,
        }
    }

    pub fn from_config(config: &MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.capacity, config.idle_timeout(), clock)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of conversations currently tracked, including idle ones not yet purged.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, key: &ConversationKey) -> Arc<ConversationSlot> {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(ConversationSlot {
                    turn_lock: Arc::new(Mutex::new(())),
                    state: Mutex::new(SlotState {
                        context: ConversationContext::empty(key.clone(), self.capacity),
                        generation: 0,
                    }),
                })
            })
            .clone()
    }

    fn is_idle(&self, context: &ConversationContext, now: DateTime<Utc>) -> bool {
        match (self.idle_timeout, context.last_activity) {
            (Some(timeout), Some(last)) => (now - last)
                .to_std()
                .map(|elapsed| elapsed > timeout)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Clears an idle context in place. Expiry is checked lazily on access.
    fn expire_if_idle(&self, state: &mut SlotState, now: DateTime<Utc>) {
        if self.is_idle(&state.context, now) {
            debug!(conversation = %state.context.key, "conversation context expired");
            state.context.clear();
        }
    }

    /// Appends a raw message and returns the updated context.
    pub async fn append(&self, key: &ConversationKey, text: &str) -> ConversationContext {
        let slot = self.slot(key);
        let mut state = slot.state.lock().await;
        let now = self.clock.now();
        self.expire_if_idle(&mut state, now);
        let evicted = state.context.messages.push(StoredMessage {
            text: text.to_string(),
            received_at: now,
        });
        if evicted.is_some() {
            debug!(conversation = %key, "evicted oldest message");
        }
        state.context.last_activity = Some(now);
        state.context.clone()
    }

    /// Current context for `key`; an empty context if none exists or it expired.
    pub async fn get(&self, key: &ConversationKey) -> ConversationContext {
        let slot = match self.slots.get(key) {
            Some(entry) => entry.value().clone(),
            None => return ConversationContext::empty(key.clone(), self.capacity),
        };
        let mut state = slot.state.lock().await;
        self.expire_if_idle(&mut state, self.clock.now());
        state.context.clone()
    }

    /// Waits for exclusive access to `key` and starts a turn.
    pub async fn begin_turn(&self, key: &ConversationKey) -> TurnGuard {
        let slot = self.slot(key);
        let permit = slot.turn_lock.clone().lock_owned().await;
        let generation = {
            let mut state = slot.state.lock().await;
            self.expire_if_idle(&mut state, self.clock.now());
            state.generation
        };
        TurnGuard {
            key: key.clone(),
            generation,
            slot,
            _permit: permit,
        }
    }

    /// Merges a finished turn into its conversation.
    ///
    /// Returns `false`, leaving the context untouched, if the conversation was
    /// reset after the turn began.
    pub async fn commit(&self, guard: &TurnGuard, update: TurnUpdate) -> bool {
        let mut state = guard.slot.state.lock().await;
        if state.generation != guard.generation {
            debug!(conversation = %guard.key, "conversation reset mid-turn, discarding turn state");
            return false;
        }
        state.context.last_resolved.overwrite_with(&update.entities);
        state.context.pending_intent = update.pending;
        true
    }

    /// Clears a conversation and invalidates any turn in flight for it.
    pub async fn reset(&self, key: &ConversationKey) {
        let Some(slot) = self.slots.get(key).map(|entry| entry.value().clone()) else {
            return;
        };
        let mut state = slot.state.lock().await;
        state.context.clear();
        state.generation += 1;
        debug!(conversation = %key, generation = state.generation, "conversation reset");
    }

    /// Drops idle conversations nobody is using. Returns how many were removed.
    pub fn purge_idle(&self) -> usize {
        let now = self.clock.now();
        let before = self.slots.len();
        self.slots.retain(|_, slot| {
            // Someone outside the map holds the slot: a turn or an access is in progress.
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.state.try_lock() {
                Ok(state) => !self.is_idle(&state.context, now),
                Err(_) => true,
            }
        });
        before - self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use rota_core::{DateRange, SlotValue, SlotSource, UserRef};

    use super::*;

    struct TestClock(StdMutex<DateTime<Utc>>);

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(StdMutex::new(Utc::now())))
        }

        fn advance(&self, secs: i64) {
            let mut now = self.0.lock().unwrap();
            *now += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn key(s: &str) -> ConversationKey {
        ConversationKey::new("test", s)
    }

    fn store(clock: Arc<TestClock>) -> MemoryStore {
        MemoryStore::new(30, Some(Duration::from_secs(60)), clock)
    }

    #[tokio::test]
    async fn get_on_unknown_key_is_empty() {
        let store = store(TestClock::new());
        let ctx = store.get(&key("nobody")).await;
        assert!(ctx.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn thirty_five_appends_keep_last_thirty_in_order() {
        let store = store(TestClock::new());
        let k = key("maria");
        for i in 0..35 {
            store.append(&k, &format!("message {i}")).await;
        }
        let ctx = store.get(&k).await;
        let expected: Vec<String> = (5..35).map(|i| format!("message {i}")).collect();
        assert_eq!(ctx.texts(), expected);
        assert_eq!(ctx.messages.len(), 30);
    }

    #[tokio::test]
    async fn idle_context_expires_lazily() {
        let clock = TestClock::new();
        let store = store(clock.clone());
        let k = key("john");
        store.append(&k, "hello").await;
        clock.advance(30);
        assert_eq!(store.get(&k).await.texts(), vec!["hello"]);
        clock.advance(61);
        assert!(store.get(&k).await.is_empty());
    }

    #[tokio::test]
    async fn commit_merges_entities_and_pending() {
        let store = store(TestClock::new());
        let k = key("ana");
        let guard = store.begin_turn(&k).await;
        let mut entities = ResolvedEntities::new();
        entities.insert(SlotValue::User(UserRef::Speaker), SlotSource::Message);
        assert!(
            store
                .commit(
                    &guard,
                    TurnUpdate {
                        entities,
                        pending: None
                    }
                )
                .await
        );
        drop(guard);
        assert_eq!(store.get(&k).await.last_resolved.user(), Some(&UserRef::Speaker));
    }

    #[tokio::test]
    async fn reset_mid_turn_discards_turn_state() {
        let store = store(TestClock::new());
        let k = key("ana");
        store.append(&k, "assign me").await;
        let guard = store.begin_turn(&k).await;
        store.reset(&k).await;

        let mut entities = ResolvedEntities::new();
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        entities.insert(SlotValue::Date(DateRange::single(day)), SlotSource::Message);
        let merged = store
            .commit(
                &guard,
                TurnUpdate {
                    entities,
                    pending: None,
                },
            )
            .await;
        assert!(!merged);
        assert!(store.get(&k).await.is_empty());
    }

    #[tokio::test]
    async fn purge_removes_only_idle_unused_slots() {
        let clock = TestClock::new();
        let store = store(clock.clone());
        store.append(&key("old"), "hi").await;
        clock.advance(120);
        store.append(&key("fresh"), "hi").await;
        assert_eq!(store.purge_idle(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn zero_timeout_never_expires() {
        let clock = TestClock::new();
        let store = MemoryStore::new(5, None, clock.clone());
        store.append(&key("k"), "hi").await;
        clock.advance(1_000_000);
        assert_eq!(store.get(&key("k")).await.texts(), vec!["hi"]);
        assert_eq!(store.purge_idle(), 0);
    }
}
