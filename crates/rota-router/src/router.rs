// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent routing state machine.
//!
//! One turn moves through: AwaitingIntent -> Dispatched(intent) -> Terminal,
//! or AwaitingIntent -> AwaitingClarification when required slots are
//! missing. A turn that starts with a pending clarification begins in
//! AwaitingClarification and is resolved against the pending slot schema
//! without consulting the classifier.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rota_config::RotaConfig;
use rota_core::{
    Classification, ClassifierAdapter, ConversationKey, HandlerRequest, HandlerResult,
    IntentHandler, IntentKind, ResolvedEntities, ResultKind, RotaError, Slot, SlotSource,
};
use rota_memory::{ConversationContext, PendingIntent, TurnUpdate};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::resolver::EntityResolver;

/// States of the routing FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Fresh turn, the message has not been classified yet.
    AwaitingIntent,
    /// A handler was chosen and invoked.
    Dispatched(IntentKind),
    /// Required slots are missing; the user has been asked for them.
    AwaitingClarification,
    /// The turn is over.
    Terminal,
}

impl fmt::Display for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterState::AwaitingIntent => write!(f, "awaiting_intent"),
            RouterState::Dispatched(intent) => write!(f, "dispatched({intent})"),
            RouterState::AwaitingClarification => write!(f, "awaiting_clarification"),
            RouterState::Terminal => write!(f, "terminal"),
        }
    }
}

/// Everything the router needs for one turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnInput<'a> {
    pub key: &'a ConversationKey,
    pub text: &'a str,
    /// Context with `text` already appended.
    pub context: &'a ConversationContext,
    pub today: NaiveDate,
    /// Ministry names known to the repository.
    pub ministries: &'a [String],
}

/// The result of routing one turn.
#[derive(Debug, Clone)]
pub struct RouteOutcome {
    pub intent: IntentKind,
    pub result: HandlerResult,
    /// Every state the turn passed through, in order.
    pub trace: Vec<RouterState>,
    /// Whether the classifier was consulted.
    pub classified: bool,
    /// What to merge back into the conversation. `None` after a failure:
    /// nothing beyond the raw message is kept.
    pub update: Option<TurnUpdate>,
}

impl RouteOutcome {
    pub fn final_state(&self) -> RouterState {
        self.trace.last().copied().unwrap_or(RouterState::AwaitingIntent)
    }
}

/// Default handler for labels with no registered handler.
pub struct UnrecognizedHandler {
    intents: Vec<String>,
}

impl UnrecognizedHandler {
    pub fn new(intents: Vec<String>) -> Self {
        Self { intents }
    }
}

#[async_trait]
impl IntentHandler for UnrecognizedHandler {
    fn intent(&self) -> IntentKind {
        IntentKind::Unrecognized
    }

    async fn handle(&self, _request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        Ok(HandlerResult::new(ResultKind::Help).with("intents", &self.intents))
    }
}

/// Dispatches classified, slot-complete turns to exactly one handler.
pub struct IntentRouter {
    classifier: Arc<dyn ClassifierAdapter>,
    resolver: EntityResolver,
    handlers: HashMap<IntentKind, Arc<dyn IntentHandler>>,
    fallback: Arc<dyn IntentHandler>,
    confidence_threshold: f32,
    classifier_timeout: Duration,
    handler_timeout: Duration,
}

/// Builder for [`IntentRouter`].
pub struct IntentRouterBuilder {
    classifier: Arc<dyn ClassifierAdapter>,
    handlers: HashMap<IntentKind, Arc<dyn IntentHandler>>,
    fallback: Option<Arc<dyn IntentHandler>>,
    recency_window: usize,
    confidence_threshold: f32,
    classifier_timeout: Duration,
    handler_timeout: Duration,
}

impl IntentRouterBuilder {
    pub fn handler(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.insert(handler.intent(), handler);
        self
    }

    pub fn fallback(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn recency_window(mut self, n: usize) -> Self {
        self.recency_window = n;
        self
    }

    pub fn confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn classifier_timeout(mut self, d: Duration) -> Self {
        self.classifier_timeout = d;
        self
    }

    pub fn handler_timeout(mut self, d: Duration) -> Self {
        self.handler_timeout = d;
        self
    }

    /// Applies thresholds and timeouts from configuration.
    pub fn config(self, config: &RotaConfig) -> Self {
        self.recency_window(config.memory.recency_window)
            .confidence_threshold(config.classifier.confidence_threshold)
            .classifier_timeout(config.classifier.timeout())
            .handler_timeout(config.repository.timeout())
    }

    pub fn build(self) -> IntentRouter {
        let fallback = self.fallback.unwrap_or_else(|| {
            let mut intents: Vec<String> = self.handlers.keys().map(|i| i.to_string()).collect();
            intents.sort();
            Arc::new(UnrecognizedHandler::new(intents))
        });
        IntentRouter {
            classifier: self.classifier,
            resolver: EntityResolver::new(self.recency_window),
            handlers: self.handlers,
            fallback,
            confidence_threshold: self.confidence_threshold,
            classifier_timeout: self.classifier_timeout,
            handler_timeout: self.handler_timeout,
        }
    }
}

impl IntentRouter {
    pub fn builder(classifier: Arc<dyn ClassifierAdapter>) -> IntentRouterBuilder {
        let defaults = RotaConfig::default();
        IntentRouterBuilder {
            classifier,
            handlers: HashMap::new(),
            fallback: None,
            recency_window: defaults.memory.recency_window,
            confidence_threshold: defaults.classifier.confidence_threshold,
            classifier_timeout: defaults.classifier.timeout(),
            handler_timeout: defaults.repository.timeout(),
        }
    }

    fn handler_for(&self, intent: IntentKind) -> Arc<dyn IntentHandler> {
        self.handlers
            .get(&intent)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Maps a classification onto a known intent. Low confidence and
    /// unknown labels both become `Unrecognized`.
    fn interpret(&self, classification: &Classification) -> IntentKind {
        if classification.confidence < self.confidence_threshold {
            debug!(
                label = %classification.label,
                confidence = classification.confidence,
                "classification below threshold"
            );
            return IntentKind::Unrecognized;
        }
        IntentKind::from_str(&classification.label).unwrap_or_else(|_| {
            debug!(label = %classification.label, "unknown intent label");
            IntentKind::Unrecognized
        })
    }

    /// Slots the handler requires that `entities` does not satisfy.
    fn missing_slots(handler: &dyn IntentHandler, entities: &ResolvedEntities) -> Vec<Slot> {
        handler
            .required_slots()
            .iter()
            .copied()
            .filter(|slot| match slot {
                Slot::Date => match entities.date() {
                    None => true,
                    Some(range) => handler.needs_single_date() && range.as_single().is_none(),
                },
                other => !entities.contains(*other),
            })
            .collect()
    }

    /// Routes one turn. Never fails: capability errors end the turn in
    /// `Terminal` with a system-error result.
    pub async fn route(&self, input: TurnInput<'_>) -> RouteOutcome {
        let mut trace = Vec::new();

        if let Some(pending) = &input.context.pending_intent {
            trace.push(RouterState::AwaitingClarification);
            let answer = self.resolver.resolve_expecting(
                input.text,
                input.context,
                input.today,
                input.ministries,
                &pending.missing,
            );
            let answered = pending
                .missing
                .iter()
                .any(|slot| answer.source(*slot) == Some(SlotSource::Message));
            if answered {
                let mut entities = pending.entities.clone();
                for (value, source) in answer.iter() {
                    if source == SlotSource::Message {
                        entities.insert(value.clone(), source);
                    }
                }
                entities.fill_from(&answer);
                debug!(conversation = %input.key, intent = %pending.intent, "clarification answered");
                let handler = self.handler_for(pending.intent);
                return self
                    .dispatch_or_clarify(input, pending.intent, handler, entities, trace, false)
                    .await;
            }
            debug!(conversation = %input.key, "reply did not answer the pending prompt, classifying afresh");
        }

        trace.push(RouterState::AwaitingIntent);
        let mut recent = input
            .context
            .recent_texts(self.resolver.recency_window() + 1);
        recent.pop();

        let classification = match timeout(
            self.classifier_timeout,
            self.classifier.classify(input.text, &recent),
        )
        .await
        {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                error!(conversation = %input.key, error = %e, "classifier failed");
                return Self::failed(trace, IntentKind::Unrecognized, "classifier", true);
            }
            Err(_) => {
                warn!(
                    conversation = %input.key,
                    timeout_ms = self.classifier_timeout.as_millis() as u64,
                    "classifier timed out"
                );
                return Self::failed(trace, IntentKind::Unrecognized, "classifier", true);
            }
        };

        let intent = self.interpret(&classification);
        let entities =
            self.resolver
                .resolve(input.text, input.context, input.today, input.ministries);
        let handler = self.handler_for(intent);
        self.dispatch_or_clarify(input, intent, handler, entities, trace, true)
            .await
    }

    async fn dispatch_or_clarify(
        &self,
        input: TurnInput<'_>,
        intent: IntentKind,
        handler: Arc<dyn IntentHandler>,
        entities: ResolvedEntities,
        mut trace: Vec<RouterState>,
        classified: bool,
    ) -> RouteOutcome {
        let missing = Self::missing_slots(handler.as_ref(), &entities);
        if !missing.is_empty() {
            trace.push(RouterState::AwaitingClarification);
            info!(conversation = %input.key, intent = %intent, ?missing, "asking for missing slots");
            let labels: Vec<String> = missing.iter().map(|s| s.to_string()).collect();
            let result = HandlerResult::new(ResultKind::Clarification)
                .with("intent", intent.to_string())
                .with("missing", labels);
            let pending = PendingIntent {
                intent,
                missing,
                entities: entities.clone(),
            };
            return RouteOutcome {
                intent,
                result,
                trace,
                classified,
                update: Some(TurnUpdate {
                    entities,
                    pending: Some(pending),
                }),
            };
        }

        trace.push(RouterState::Dispatched(intent));
        info!(conversation = %input.key, intent = %intent, "dispatching");
        let request = HandlerRequest {
            key: input.key.clone(),
            entities: entities.clone(),
            today: input.today,
        };
        let outcome = timeout(self.handler_timeout, handler.handle(request)).await;
        match outcome {
            Ok(Ok(result)) => {
                trace.push(RouterState::Terminal);
                RouteOutcome {
                    intent,
                    result,
                    trace,
                    classified,
                    update: Some(TurnUpdate {
                        entities,
                        pending: None,
                    }),
                }
            }
            Ok(Err(e)) => {
                error!(conversation = %input.key, intent = %intent, error = %e, "handler failed");
                Self::failed(trace, intent, "handler", classified)
            }
            Err(_) => {
                warn!(
                    conversation = %input.key,
                    intent = %intent,
                    timeout_ms = self.handler_timeout.as_millis() as u64,
                    "handler timed out"
                );
                Self::failed(trace, intent, "handler", classified)
            }
        }
    }

    fn failed(
        mut trace: Vec<RouterState>,
        intent: IntentKind,
        operation: &str,
        classified: bool,
    ) -> RouteOutcome {
        trace.push(RouterState::Terminal);
        RouteOutcome {
            intent,
            result: HandlerResult::system_error(operation),
            trace,
            classified,
            update: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::{AdapterType, HealthStatus, PluginAdapter, SystemClock};
    use rota_memory::MemoryStore;
    use tracing_test::traced_test;

    struct SlowClassifier;

    #[async_trait]
    impl PluginAdapter for SlowClassifier {
        fn name(&self) -> &str {
            "slow"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
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
    impl ClassifierAdapter for SlowClassifier {
        async fn classify(&self, _text: &str, _recent: &[String]) -> Result<Classification, RotaError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Classification::new("roster", 1.0))
        }
    }

    #[test]
    fn state_labels() {
        assert_eq!(RouterState::AwaitingIntent.to_string(), "awaiting_intent");
        assert_eq!(
            RouterState::Dispatched(IntentKind::Roster).to_string(),
            "dispatched(roster)"
        );
    }

    #[test]
    fn unknown_label_and_low_confidence_are_unrecognized() {
        let router = IntentRouter::builder(Arc::new(SlowClassifier)).build();
        assert_eq!(
            router.interpret(&Classification::new("order_pizza", 0.99)),
            IntentKind::Unrecognized
        );
        assert_eq!(
            router.interpret(&Classification::new("roster", 0.1)),
            IntentKind::Unrecognized
        );
        assert_eq!(
            router.interpret(&Classification::new("roster", 0.8)),
            IntentKind::Roster
        );
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn classifier_timeout_is_logged_and_terminal() {
        let router = IntentRouter::builder(Arc::new(SlowClassifier))
            .classifier_timeout(Duration::from_millis(50))
            .build();
        let store = MemoryStore::new(10, None, Arc::new(SystemClock));
        let key = ConversationKey::new("cli", "ana");
        let context = store.append(&key, "who is serving sunday").await;

        let outcome = router
            .route(TurnInput {
                key: &key,
                text: "who is serving sunday",
                context: &context,
                today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                ministries: &[],
            })
            .await;

        assert_eq!(
            outcome.trace,
            vec![RouterState::AwaitingIntent, RouterState::Terminal]
        );
        assert_eq!(outcome.result, HandlerResult::system_error("classifier"));
        assert!(outcome.update.is_none());
        assert!(logs_contain("classifier timed out"));
    }
}
