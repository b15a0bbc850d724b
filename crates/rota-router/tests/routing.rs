// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rota_core::{
    AdapterType, Classification, ClassifierAdapter, ConversationKey, HandlerRequest,
    HandlerResult, HealthStatus, IntentHandler, IntentKind, PluginAdapter, ResultKind, RotaError,
    Slot, SystemClock, UserRef,
};
use rota_memory::MemoryStore;
use rota_router::{IntentRouter, RouteOutcome, RouterState, TurnInput};

/// Returns the first label whose keyword occurs in the text.
struct StubClassifier {
    rules: Vec<(&'static str, &'static str, f32)>,
    calls: AtomicUsize,
    fail: bool,
}

impl StubClassifier {
    fn new(rules: Vec<(&'static str, &'static str, f32)>) -> Arc<Self> {
        Arc::new(Self {
            rules,
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            rules: Vec::new(),
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }
}

#[async_trait]
impl PluginAdapter for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }
    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
    }
    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }
    async fn health_check(&self) -> Result<HealthStatus, RotaError> {
        Ok(HealthStatus::Healthy)
    }
    async fn shutdown(&self) -> Result<(), RotaError> {
        Ok(())
    }
}

#[async_trait]
impl ClassifierAdapter for StubClassifier {
    async fn classify(&self, text: &str, _recent: &[String]) -> Result<Classification, RotaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RotaError::Classifier {
                message: "model unavailable".into(),
            });
        }
        let lower = text.to_lowercase();
        Ok(self
            .rules
            .iter()
            .find(|(kw, _, _)| lower.contains(kw))
            .map(|(_, label, conf)| Classification::new(*label, *conf))
            .unwrap_or_else(|| Classification::new("unrecognized", 0.0)))
    }
}

/// Echoes the resolved user back so tests can see what was dispatched.
struct AssignStub {
    delay: Option<Duration>,
}

#[async_trait]
impl IntentHandler for AssignStub {
    fn intent(&self) -> IntentKind {
        IntentKind::AssignVolunteer
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::User, Slot::Date, Slot::Role]
    }

    fn needs_single_date(&self) -> bool {
        true
    }

    async fn handle(&self, request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let user = match request.entities.user() {
            Some(UserRef::Named(name)) => name.clone(),
            Some(UserRef::Speaker) => "speaker".to_string(),
            None => return Err(RotaError::Internal("dispatched without user".into())),
        };
        Ok(HandlerResult::new(ResultKind::AssignmentAccepted)
            .with("user", user)
            .with("date", request.entities.date().map(|d| d.to_string())))
    }
}

struct Fixture {
    store: MemoryStore,
    router: IntentRouter,
    classifier: Arc<StubClassifier>,
    key: ConversationKey,
}

impl Fixture {
    fn new(classifier: Arc<StubClassifier>, delay: Option<Duration>) -> Self {
        let router = IntentRouter::builder(classifier.clone())
            .handler(Arc::new(AssignStub { delay }))
            .handler_timeout(Duration::from_millis(100))
            .build();
        Self {
            store: MemoryStore::new(30, None, Arc::new(SystemClock)),
            router,
            classifier,
            key: ConversationKey::new("test", "5511"),
        }
    }

    fn default_rules() -> Arc<StubClassifier> {
        StubClassifier::new(vec![("assign", "assign_volunteer", 0.9), ("hmm", "assign_volunteer", 0.2)])
    }

    async fn turn(&self, text: &str) -> RouteOutcome {
        let guard = self.store.begin_turn(&self.key).await;
        let context = self.store.append(&self.key, text).await;
        let outcome = self
            .router
            .route(TurnInput {
                key: &self.key,
                text,
                context: &context,
                today: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                ministries: &[],
            })
            .await;
        if let Some(update) = outcome.update.clone() {
            self.store.commit(&guard, update).await;
        }
        outcome
    }
}

#[tokio::test]
async fn complete_turn_dispatches_once() {
    let fx = Fixture::new(Fixture::default_rules(), None);
    let outcome = fx.turn("Assign Maria to sound on January 7").await;
    assert_eq!(outcome.result.kind, ResultKind::AssignmentAccepted);
    assert_eq!(
        outcome.trace,
        vec![
            RouterState::AwaitingIntent,
            RouterState::Dispatched(IntentKind::AssignVolunteer),
            RouterState::Terminal
        ]
    );
    assert!(outcome.classified);
}

#[tokio::test]
async fn clarification_is_answered_without_reclassifying() {
    let fx = Fixture::new(Fixture::default_rules(), None);

    // An earlier turn establishes the date.
    fx.turn("Assign Maria to media on January 7").await;

    let ask = fx.turn("assign someone to sound").await;
    assert_eq!(ask.result.kind, ResultKind::Clarification);
    assert_eq!(ask.final_state(), RouterState::AwaitingClarification);
    assert_eq!(
        ask.result.field("missing"),
        Some(&serde_json::json!(["user"]))
    );
    let calls_before = fx.classifier.calls.load(Ordering::SeqCst);

    let answer = fx.turn("John").await;
    assert_eq!(answer.result.kind, ResultKind::AssignmentAccepted);
    assert_eq!(answer.result.field("user"), Some(&serde_json::json!("John")));
    assert_eq!(answer.result.field("date"), Some(&serde_json::json!("2024-01-07")));
    assert!(!answer.classified);
    assert_eq!(fx.classifier.calls.load(Ordering::SeqCst), calls_before);
    assert_eq!(answer.trace[0], RouterState::AwaitingClarification);

    // The pending intent is cleared after dispatch.
    assert!(fx.store.get(&fx.key).await.pending_intent.is_none());
}

#[tokio::test]
async fn multi_date_range_asks_which_date() {
    let fx = Fixture::new(Fixture::default_rules(), None);
    let ask = fx.turn("Assign Maria to sound on all Sundays in January").await;
    assert_eq!(ask.result.field("missing"), Some(&serde_json::json!(["date"])));

    let answer = fx.turn("the second one").await;
    assert_eq!(answer.result.kind, ResultKind::AssignmentAccepted);
    assert_eq!(answer.result.field("date"), Some(&serde_json::json!("2024-01-14")));
}

#[tokio::test]
async fn unrelated_reply_drops_pending_and_classifies() {
    let fx = Fixture::new(Fixture::default_rules(), None);
    fx.turn("assign someone to sound").await;
    let reply = fx.turn("show the roster").await;
    assert!(reply.classified);
    assert_eq!(reply.result.kind, ResultKind::Help);
}

#[tokio::test]
async fn low_confidence_routes_to_help() {
    let fx = Fixture::new(Fixture::default_rules(), None);
    let outcome = fx.turn("hmm Maria sound January 7").await;
    assert_eq!(outcome.intent, IntentKind::Unrecognized);
    assert_eq!(outcome.result.kind, ResultKind::Help);
    assert_eq!(
        outcome.result.field("intents"),
        Some(&serde_json::json!(["assign_volunteer"]))
    );
}

#[tokio::test]
async fn classifier_failure_is_terminal_and_keeps_only_the_message() {
    let fx = Fixture::new(StubClassifier::failing(), None);
    let outcome = fx.turn("Assign Maria to sound on January 7").await;
    assert!(outcome.result.is_system_error());
    assert_eq!(outcome.final_state(), RouterState::Terminal);
    assert!(outcome.update.is_none());

    let ctx = fx.store.get(&fx.key).await;
    assert_eq!(ctx.texts(), vec!["Assign Maria to sound on January 7"]);
    assert!(ctx.last_resolved.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_handler_times_out_into_system_error() {
    let fx = Fixture::new(Fixture::default_rules(), Some(Duration::from_secs(5)));
    let outcome = fx.turn("Assign Maria to sound on January 7").await;
    assert!(outcome.result.is_system_error());
    assert_eq!(outcome.result.field("operation"), Some(&serde_json::json!("handler")));
    assert!(outcome.update.is_none());
    assert!(fx.store.get(&fx.key).await.last_resolved.is_empty());
}
