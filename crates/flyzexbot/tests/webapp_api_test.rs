//! Integration tests for the dashboard API, driving the axum router
//! directly with `tower::ServiceExt::oneshot`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tower::ServiceExt;

use flyzex_core::application::{Answer, Application};
use flyzex_core::config::{
    CupSettings, IntakeSettings, LoggingSettings, Settings, StorageSettings, TelegramSettings,
    WebAppSettings, XpSettings,
};
use flyzex_core::storage::Cup;
use flyzex_core::Storage;
use flyzexbot::webapp::create_webapp_router;

fn test_settings() -> Settings {
    Settings {
        telegram: TelegramSettings {
            bot_token_env: "BOT_TOKEN".to_string(),
            owner_id: 1,
            application_review_chat: None,
        },
        intake: IntakeSettings {
            questions: vec!["Why?".to_string()],
            invite_code: "GUILD-123".to_string(),
        },
        xp: XpSettings {
            message_reward: 5,
            leaderboard_size: 10,
        },
        cups: CupSettings { leaderboard_size: 10 },
        storage: StorageSettings {
            path: PathBuf::from("unused.json"),
        },
        logging: LoggingSettings::default(),
        webapp: WebAppSettings::default(),
    }
}

fn application(user_id: i64, answers: &[(&str, &str)]) -> Application {
    Application::new(
        user_id,
        None,
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

async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let router = create_webapp_router(Arc::new(Storage::in_memory()), Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn pending_endpoint_includes_full_qa_breakdown() {
    let storage = Arc::new(Storage::in_memory());
    storage
        .submit_application(application(10, &[("Name?", "Alice"), ("Age?", "18"), ("Region?", "EU")]))
        .await
        .unwrap();
    storage.submit_application(application(11, &[("Name?", "Bob")])).await.unwrap();
    storage.approve(11).await.unwrap();

    let router = create_webapp_router(storage, Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/applications/pending").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    let answers = body["applications"][0]["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 3);
    assert_eq!(answers[0]["question"], "Name?");
    assert_eq!(answers[0]["answer"], "Alice");
    assert_eq!(answers[2]["answer"], "EU");
    assert_eq!(body["applications"][0]["status"], "pending");
}

#[tokio::test]
async fn xp_endpoint_sorts_and_limits() {
    let storage = Arc::new(Storage::in_memory());
    for (user, score) in [(1, 10), (2, 40), (3, 30), (4, 20), (5, 50)] {
        storage.add_xp(-500, user, score).await.unwrap();
    }

    let router = create_webapp_router(storage, Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/xp?chat_id=-500&limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat_id"], -500);
    assert_eq!(body["limit"], 3);
    let leaderboard = body["leaderboard"].as_array().unwrap();
    assert_eq!(leaderboard.len(), 3);
    assert_eq!(leaderboard[0]["user_id"], 5);
    assert_eq!(leaderboard[0]["score"], 50);
    assert_eq!(leaderboard[1]["score"], 40);
    assert_eq!(leaderboard[2]["score"], 30);
}

#[tokio::test]
async fn xp_endpoint_without_chat_id_is_a_persian_bad_request() {
    let router = create_webapp_router(Arc::new(Storage::in_memory()), Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/xp").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "پارامتر chat_id الزامی است.");
}

#[tokio::test]
async fn xp_endpoint_defaults_limit_from_settings() {
    let storage = Arc::new(Storage::in_memory());
    storage.add_xp(-500, 1, 10).await.unwrap();

    let router = create_webapp_router(storage, Arc::new(test_settings()));
    let (_, body) = get_json(&router, "/api/xp?chat_id=-500").await;
    assert_eq!(body["limit"], 10);
}

#[tokio::test]
async fn cups_endpoint_returns_archive() {
    let storage = Arc::new(Storage::in_memory());
    storage
        .add_cup(
            -500,
            Cup::new("Spring Cup".to_string(), "1v1 bracket".to_string(), vec![
                "Alice".to_string(),
                "Bob".to_string(),
            ]),
        )
        .await
        .unwrap();

    let router = create_webapp_router(storage, Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/cups?chat_id=-500").await;

    assert_eq!(status, StatusCode::OK);
    let cups = body["cups"].as_array().unwrap();
    assert_eq!(cups.len(), 1);
    assert_eq!(cups[0]["title"], "Spring Cup");
    assert_eq!(cups[0]["podium"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn insights_total_equals_status_count_sum() {
    let storage = Arc::new(Storage::in_memory());
    storage.submit_application(application(1, &[("Q", "aaaa")])).await.unwrap();
    storage.submit_application(application(2, &[("Q", "aa")])).await.unwrap();
    storage.submit_application(application(3, &[("Q", "x")])).await.unwrap();
    storage.deny(3).await.unwrap();

    let router = create_webapp_router(storage, Arc::new(test_settings()));
    let (status, body) = get_json(&router, "/api/applications/insights").await;

    assert_eq!(status, StatusCode::OK);
    let counts = body["status_counts"].as_object().unwrap();
    let sum: u64 = counts.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(body["total"].as_u64().unwrap(), sum);
    assert_eq!(body["pending"], 2);
    assert_eq!(body["average_pending_answer_length"], 3.0);
    assert_eq!(body["recent_updates"][0]["user_id"], 3);
    assert_eq!(body["recent_updates"][0]["status"], "denied");
    assert_eq!(body["languages"]["fa"], 3);
}
