// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end conversations through the full turn pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rota_core::{
    HandlerRequest, HandlerResult, IntentHandler, IntentKind, RepositoryAdapter, ResultKind,
    RotaError, Slot,
};
use rota_router::RouterState;
use rota_test_utils::{ScriptedClassifier, TestHarness};

const MARIA: &str = "5511999990000";
const JOHN: &str = "5511988880000";

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn church() -> TestHarness {
    TestHarness::builder()
        .ministry("Worship", true)
        .ministry("Youth", false)
        .user("Maria", "Silva", MARIA)
        .user("John", "Smith", JOHN)
        .unavailable("maria", date(1, 14))
        .build()
}

async fn with_january(harness: &TestHarness) {
    let reply = harness
        .reply(MARIA, "Create a schedule for Worship every Sunday in January")
        .await;
    assert_eq!(reply, "Created 4 Sunday occurrences for Worship in January 2024.");
}

#[tokio::test]
async fn create_schedule_for_every_sunday() {
    let harness = church();
    with_january(&harness).await;
    assert_eq!(harness.repository.schedule_count().await, 1);
    let occurrences = harness
        .repository
        .find_occurrences(date(1, 21), None)
        .await
        .unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].day_label(), "Sunday");
}

#[tokio::test]
async fn inactive_ministry_cannot_schedule() {
    let harness = church();
    let reply = harness
        .reply(MARIA, "Create a schedule for Youth every Sunday in January")
        .await;
    assert_eq!(reply, "Youth is inactive, so it can't create schedules.");
    assert_eq!(harness.repository.schedule_count().await, 0);
}

#[tokio::test]
async fn assign_conflict_and_duplicate() {
    let harness = church();
    with_january(&harness).await;

    let reply = harness
        .reply(JOHN, "Assign John to worship lead on January 7")
        .await;
    assert_eq!(
        reply,
        "Done! John Smith is on worship lead for Worship on Sunday, 2024-01-07."
    );

    let conflict = harness
        .say(MARIA, "Assign Maria to worship lead on January 7")
        .await;
    assert_eq!(conflict.kind, ResultKind::AssignmentConflict);
    assert_eq!(
        conflict.reply,
        "John Smith is already on worship lead on 2024-01-07, so I can't add Maria Silva."
    );

    let duplicate = harness
        .say(JOHN, "Assign John to worship lead on January 7")
        .await;
    assert_eq!(duplicate.kind, ResultKind::AssignmentDuplicate);
    assert_eq!(harness.repository.all_assignments().await.len(), 1);
}

#[tokio::test]
async fn blocked_date_is_reported_as_unavailable() {
    let harness = church();
    with_january(&harness).await;
    let reply = harness
        .reply(MARIA, "Assign Maria to media on January 14")
        .await;
    assert_eq!(reply, "Maria Silva isn't available on 2024-01-14.");
}

#[tokio::test]
async fn clarification_completes_without_reclassifying() {
    let classifier = Arc::new(
        ScriptedClassifier::new()
            .rule("create", "create_schedule")
            .rule("assign", "assign_volunteer"),
    );
    let harness = TestHarness::builder()
        .ministry("Worship", true)
        .user("Maria", "Silva", MARIA)
        .user("John", "Smith", JOHN)
        .classifier(classifier.clone())
        .build();
    with_january(&harness).await;

    harness
        .reply(MARIA, "Assign Maria to media on January 7")
        .await;
    let ask = harness.say(MARIA, "assign someone to sound").await;
    assert_eq!(ask.final_state, RouterState::AwaitingClarification);
    assert_eq!(ask.reply, "To assign volunteer, I still need the user.");

    let calls = classifier.calls();
    let done = harness.say(MARIA, "John").await;
    assert!(!done.classified);
    assert_eq!(classifier.calls(), calls);
    assert_eq!(done.intent, IntentKind::AssignVolunteer);
    assert_eq!(
        done.reply,
        "Done! John Smith is on sound tech for Worship on Sunday, 2024-01-07."
    );
}

#[tokio::test]
async fn my_assignments_confirm_and_stats() {
    let harness = church();
    with_january(&harness).await;
    harness
        .reply(MARIA, "Assign Maria to worship lead on January 7")
        .await;

    let list = harness.reply(MARIA, "show my assignments").await;
    assert_eq!(
        list,
        "Maria Silva's assignments:\n- Sunday 2024-01-07: worship lead (Worship, ASSIGNED)"
    );

    let confirmed = harness.reply(MARIA, "I confirm for Sunday").await;
    assert_eq!(
        confirmed,
        "Got it. Maria Silva's worship lead assignment on 2024-01-07 is now confirmed."
    );

    let again = harness.say(MARIA, "I confirm for Sunday").await;
    assert_eq!(again.kind, ResultKind::StatusTransitionInvalid);

    let stats = harness.reply(JOHN, "stats for January").await;
    assert!(
        stats.starts_with("Between 2024-01-01 and 2024-01-31: 1 assignments, 1 confirmed, 0 declined"),
        "{stats}"
    );
}

#[tokio::test]
async fn roster_lists_active_assignments() {
    let harness = church();
    with_january(&harness).await;
    harness
        .reply(JOHN, "Assign John to sound on January 7")
        .await;
    harness
        .reply(MARIA, "Assign Maria to media on January 7")
        .await;
    harness.reply(MARIA, "I can't make it on January 7").await;

    let roster = harness.reply(JOHN, "who is serving on January 7").await;
    assert_eq!(
        roster,
        "Serving on 2024-01-07:\n- 2024-01-07 Worship, sound tech: John Smith (ASSIGNED)"
    );

    let empty = harness.reply(JOHN, "who is serving on January 21").await;
    assert_eq!(empty, "Nobody is scheduled on 2024-01-21.");
}

#[tokio::test]
async fn reset_clears_memory() {
    let harness = church();
    harness
        .reply(MARIA, "Assign Maria to media on January 7")
        .await;
    let report = harness.say(MARIA, "start over").await;
    assert_eq!(report.reply, "Okay, I've cleared our conversation.");
    assert!(!report.merged);
    let context = harness
        .processor
        .memory()
        .get(&TestHarness::key(MARIA))
        .await;
    assert!(context.is_empty());
    assert!(context.last_resolved.is_empty());
}

#[tokio::test]
async fn oversized_range_is_rejected_and_remembered_by_its_bounds() {
    let harness = church();
    let report = harness
        .say(
            MARIA,
            "Create a schedule for Worship every Sunday from 0001-01-01 to 9999-12-31",
        )
        .await;
    assert_eq!(report.kind, ResultKind::InvalidRange);
    assert_eq!(
        report.reply,
        "A schedule can cover at most 366 days; 0001-01-01 to 9999-12-31 is too long."
    );
    assert_eq!(harness.repository.schedule_count().await, 0);

    let key = TestHarness::key(MARIA);
    let context = harness.processor.memory().get(&key).await;
    let remembered = context.last_resolved.date().cloned().unwrap();
    assert_eq!(remembered.start(), NaiveDate::from_ymd_opt(1, 1, 1).unwrap());
    assert_eq!(remembered.end(), NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());
    assert_eq!(remembered.len(), 3_652_059);

    // Every later turn clones the context and re-reads the message from
    // history; neither may cost time proportional to the range length.
    let started = std::time::Instant::now();
    for _ in 0..3 {
        harness.reply(MARIA, "hello").await;
    }
    for _ in 0..1_000 {
        let context = harness.processor.memory().get(&key).await;
        assert!(context.last_resolved.date().is_some());
    }
    assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
}

#[tokio::test]
async fn idle_conversation_is_forgotten() {
    let harness = church();
    with_january(&harness).await;
    harness
        .reply(MARIA, "Assign Maria to media on January 7")
        .await;

    harness.clock.advance(chrono::Duration::hours(2));
    let context = harness
        .processor
        .memory()
        .get(&TestHarness::key(MARIA))
        .await;
    assert!(context.is_empty());

    let ask = harness.say(MARIA, "I can't make it").await;
    assert_eq!(ask.kind, ResultKind::Clarification);
}

#[tokio::test(start_paused = true)]
async fn slow_repository_yields_system_error_and_keeps_only_the_message() {
    let harness = TestHarness::builder()
        .ministry("Worship", true)
        .user("Maria", "Silva", MARIA)
        .repository_latency(Duration::from_secs(30))
        .build();

    let report = harness
        .say(MARIA, "Assign Maria to media on January 7")
        .await;
    assert_eq!(report.kind, ResultKind::SystemError);
    assert_eq!(
        report.reply,
        "Something went wrong on my side. Please try again in a moment."
    );
    assert!(!report.merged);

    let context = harness
        .processor
        .memory()
        .get(&TestHarness::key(MARIA))
        .await;
    assert_eq!(context.texts(), vec!["Assign Maria to media on January 7"]);
    assert!(context.last_resolved.is_empty());
    assert!(context.pending_intent.is_none());
}

/// Roster handler that takes a while, so a reset can land mid-turn.
struct SlowRoster;

#[async_trait]
impl IntentHandler for SlowRoster {
    fn intent(&self) -> IntentKind {
        IntentKind::Roster
    }

    fn required_slots(&self) -> &'static [Slot] {
        &[Slot::Date]
    }

    async fn handle(&self, _request: HandlerRequest) -> Result<HandlerResult, RotaError> {
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(HandlerResult::new(ResultKind::RosterEmpty).with("period", "on 2024-01-07"))
    }
}

#[tokio::test(start_paused = true)]
async fn reset_mid_turn_discards_the_turn_state() {
    let harness = Arc::new(
        TestHarness::builder()
            .classifier(Arc::new(ScriptedClassifier::new().rule("roster", "roster")))
            .handler(Arc::new(SlowRoster))
            .build(),
    );

    let turn = {
        let harness = harness.clone();
        tokio::spawn(async move { harness.say(MARIA, "roster for January 7").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    harness
        .processor
        .memory()
        .reset(&TestHarness::key(MARIA))
        .await;

    let report = turn.await.unwrap();
    assert_eq!(report.reply, "Nobody is scheduled on 2024-01-07.");
    assert!(!report.merged);
    let context = harness
        .processor
        .memory()
        .get(&TestHarness::key(MARIA))
        .await;
    assert!(context.last_resolved.is_empty());
}
