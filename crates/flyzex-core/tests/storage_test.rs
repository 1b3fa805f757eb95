//! Integration tests for the guild store: lifecycle rules, persistence,
//! leaderboards, and the insights feed.

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

use flyzex_core::application::{Answer, Application, ApplicationStatus};
use flyzex_core::storage::{Cup, ReviewOutcome, Storage, SubmitOutcome};

fn application(user_id: i64, answers: &[(&str, &str)]) -> Application {
    Application::new(
        user_id,
        Some(format!("user{user_id}")),
        format!("User {user_id}"),
        answers
            .iter()
            .map(|(q, a)| Answer {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect(),
        Some("fa".to_string()),
    )
}

#[tokio::test]
async fn completed_flow_yields_one_pending_application() {
    let storage = Storage::in_memory();
    let app = application(
        10,
        &[("Name?", "Alice"), ("Age?", "18"), ("Region?", "EU")],
    );

    assert_eq!(storage.submit_application(app).await.unwrap(), SubmitOutcome::Accepted);

    let pending = storage.pending_applications().await;
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].answers.iter().map(|a| a.answer.as_str()).collect::<Vec<_>>(),
        vec!["Alice", "18", "EU"]
    );
    assert_eq!(pending[0].status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn second_submission_while_pending_is_rejected() {
    let storage = Storage::in_memory();
    storage.submit_application(application(10, &[])).await.unwrap();

    assert_eq!(
        storage.submit_application(application(10, &[])).await.unwrap(),
        SubmitOutcome::AlreadyPending
    );
    assert_eq!(storage.pending_applications().await.len(), 1);
}

#[tokio::test]
async fn approve_is_idempotent_for_side_effects() {
    let storage = Storage::in_memory();
    storage.submit_application(application(10, &[])).await.unwrap();

    let first = storage.approve(10).await.unwrap();
    assert!(matches!(first, ReviewOutcome::Updated(ref app) if app.status == ApplicationStatus::Approved));

    // The second press must not report Updated — that is what prevents a
    // duplicate invite from being sent.
    let second = storage.approve(10).await.unwrap();
    assert!(matches!(second, ReviewOutcome::NotPending(ApplicationStatus::Approved)));
}

#[tokio::test]
async fn status_transitions_never_move_backward() {
    let storage = Storage::in_memory();
    storage.submit_application(application(10, &[])).await.unwrap();
    storage.deny(10).await.unwrap();

    assert!(matches!(
        storage.approve(10).await.unwrap(),
        ReviewOutcome::NotPending(ApplicationStatus::Denied)
    ));
    assert!(matches!(
        storage.withdraw(10).await.unwrap(),
        ReviewOutcome::NotPending(ApplicationStatus::Denied)
    ));
    assert_eq!(
        storage.application(10).await.unwrap().status,
        ApplicationStatus::Denied
    );
}

#[tokio::test]
async fn review_of_unknown_user_reports_not_found() {
    let storage = Storage::in_memory();
    assert!(matches!(storage.approve(99).await.unwrap(), ReviewOutcome::NotFound));
}

#[tokio::test]
async fn withdrawal_allows_reapplication_but_decisions_do_not() {
    let storage = Storage::in_memory();

    storage.submit_application(application(10, &[])).await.unwrap();
    storage.withdraw(10).await.unwrap();
    assert_eq!(
        storage.submit_application(application(10, &[])).await.unwrap(),
        SubmitOutcome::Accepted
    );

    storage.deny(10).await.unwrap();
    assert_eq!(
        storage.submit_application(application(10, &[])).await.unwrap(),
        SubmitOutcome::AlreadyDecided(ApplicationStatus::Denied)
    );
}

#[tokio::test]
async fn document_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guild.json");

    {
        let storage = Storage::open(&path).await.unwrap();
        storage.add_admin(1).await.unwrap();
        storage
            .submit_application(application(10, &[("Q", "A")]))
            .await
            .unwrap();
        storage.add_xp(-100, 10, 5).await.unwrap();
        storage
            .add_cup(-100, Cup::new("Spring Cup".into(), "1v1".into(), vec!["a".into()]))
            .await
            .unwrap();
        storage.approve(10).await.unwrap();
    }

    let reopened = Storage::open(&path).await.unwrap();
    assert!(reopened.is_admin(1).await);
    assert_eq!(
        reopened.application(10).await.unwrap().status,
        ApplicationStatus::Approved
    );
    assert_eq!(reopened.xp_leaderboard(-100, 10).await, vec![(10, 5)]);
    assert_eq!(reopened.cups(-100, 10).await[0].title, "Spring Cup");

    let report = reopened.insights().await;
    assert_eq!(report.recent_updates.len(), 1);
    assert_eq!(report.recent_updates[0].status, ApplicationStatus::Approved);
}

#[tokio::test]
async fn opening_a_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path().join("absent.json")).await.unwrap();
    assert!(storage.pending_applications().await.is_empty());
}

#[tokio::test]
async fn leaderboard_is_sorted_and_limited() {
    let storage = Storage::in_memory();
    let chat = -42;
    storage.add_xp(chat, 1, 10).await.unwrap();
    storage.add_xp(chat, 2, 30).await.unwrap();
    storage.add_xp(chat, 3, 20).await.unwrap();
    storage.add_xp(chat, 4, 40).await.unwrap();
    storage.add_xp(chat, 2, 5).await.unwrap();

    let top = storage.xp_leaderboard(chat, 3).await;
    assert_eq!(top, vec![(4, 40), (2, 35), (3, 20)]);

    assert!(storage.xp_leaderboard(-1, 3).await.is_empty());
}

#[tokio::test]
async fn xp_accumulates_per_chat() {
    let storage = Storage::in_memory();
    assert_eq!(storage.add_xp(-1, 7, 5).await.unwrap(), 5);
    assert_eq!(storage.add_xp(-1, 7, 5).await.unwrap(), 10);
    assert_eq!(storage.add_xp(-2, 7, 5).await.unwrap(), 5);
}

#[tokio::test]
async fn cups_come_back_newest_first() {
    let storage = Storage::in_memory();
    let chat = -42;
    let now = Utc::now();

    for (i, title) in ["first", "second", "third"].iter().enumerate() {
        storage
            .add_cup(
                chat,
                Cup {
                    title: title.to_string(),
                    description: String::new(),
                    podium: vec!["winner".to_string()],
                    created_at: now + Duration::minutes(i as i64),
                },
            )
            .await
            .unwrap();
    }

    let cups = storage.cups(chat, 2).await;
    assert_eq!(
        cups.iter().map(|c| c.title.as_str()).collect::<Vec<_>>(),
        vec!["third", "second"]
    );
}

#[tokio::test]
async fn admin_registration_reports_duplicates() {
    let storage = Storage::in_memory();
    assert!(storage.add_admin(5).await.unwrap());
    assert!(!storage.add_admin(5).await.unwrap());
    assert_eq!(storage.list_admins().await, vec![5]);

    assert!(storage.remove_admin(5).await.unwrap());
    assert!(!storage.remove_admin(5).await.unwrap());
    assert!(!storage.is_admin(5).await);
}

#[tokio::test]
async fn insights_total_matches_status_counts() {
    let storage = Storage::in_memory();
    storage.submit_application(application(1, &[("Q", "aaaa")])).await.unwrap();
    storage.submit_application(application(2, &[("Q", "aa")])).await.unwrap();
    storage.submit_application(application(3, &[("Q", "a")])).await.unwrap();
    storage.approve(3).await.unwrap();

    let report = storage.insights().await;
    assert_eq!(report.total, report.status_counts.values().sum::<usize>());
    assert_eq!(report.pending, 2);
    assert_eq!(report.average_pending_answer_length, 3.0);
    assert_eq!(report.recent_updates[0].user_id, 3);
}
