// SPDX-FileCopyrightText: 2026 Rota Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use chrono::NaiveDate;
use rota_core::{
    AssignmentDecision, AssignmentId, AssignmentRequest, CommitOutcome, Ministry, MinistryId,
    RepositoryAdapter, RoleCode, Schedule, ScheduleId, ScheduleOccurrence, UserId, UserRecord,
};
use rota_storage::InMemoryRepository;

fn volunteer(n: usize) -> UserRecord {
    UserRecord {
        id: UserId(format!("u{n}")),
        first_name: format!("Volunteer{n}"),
        last_name: "Test".into(),
        phone_number: format!("55110000{n:04}"),
        is_active: true,
        is_available: true,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_resolvers_commit_one_holder() {
    let mut builder = InMemoryRepository::builder().ministry(Ministry {
        id: MinistryId::from("sound"),
        name: "Sound".into(),
        leader: None,
        is_active: true,
    });
    for n in 0..16 {
        builder = builder.user(volunteer(n));
    }
    let repo = Arc::new(builder.build());

    let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
    let schedule = Schedule {
        id: ScheduleId::from("jan"),
        ministry_id: MinistryId::from("sound"),
        title: "Sound - January 2024".into(),
        start_date: sunday,
        end_date: sunday,
    };
    let occurrence = ScheduleOccurrence::new(schedule.id.clone(), schedule.ministry_id.clone(), sunday);
    repo.commit_occurrences(schedule, vec![occurrence.clone()])
        .await
        .unwrap();

    // Every task resolves against the same empty snapshot, so each gets an
    // advisory Accepted; only the commit decides.
    let snapshot = repo.get_existing_assignments(occurrence.id()).await.unwrap();
    let mut tasks = Vec::new();
    for n in 0..16 {
        let repo = repo.clone();
        let snapshot = snapshot.clone();
        let occurrence_id = occurrence.id().clone();
        tasks.push(tokio::spawn(async move {
            let request = AssignmentRequest {
                occurrence_id,
                user_id: UserId(format!("u{n}")),
                role: RoleCode::SoundTech,
            };
            let avail = repo
                .get_user_availability(&request.user_id)
                .await
                .unwrap()
                .unwrap();
            let decision = rota_schedule::resolve(&request, &snapshot, &avail, sunday);
            let AssignmentDecision::Accepted(id) = decision else {
                panic!("empty snapshot must be accepted");
            };
            repo.commit_assignment(request, id).await.unwrap()
        }));
    }

    let mut committed = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            CommitOutcome::Committed(_) => committed += 1,
            CommitOutcome::Conflict(_) => conflicts += 1,
            CommitOutcome::Duplicate(_) => panic!("distinct users cannot duplicate"),
        }
    }
    assert_eq!(committed, 1);
    assert_eq!(conflicts, 15);
    assert_eq!(repo.all_assignments().await.len(), 1);

    let again = repo
        .commit_assignment(
            AssignmentRequest {
                occurrence_id: occurrence.id().clone(),
                user_id: UserId::from("u99"),
                role: RoleCode::Media,
            },
            AssignmentId::generate(),
        )
        .await
        .unwrap();
    assert!(matches!(again, CommitOutcome::Committed(_)));
}
