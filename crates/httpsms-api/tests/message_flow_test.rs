//! End-to-end message lifecycle against PostgreSQL.

mod common;

use axum::http::StatusCode;
use common::{CONTACT, OWNER, query_phone};
use serde_json::json;
use sqlx::{PgPool, Row};

async fn send_message(pool: &PgPool) -> String {
    let (status, json) = common::post_json(
        common::build_test_app(pool.clone()),
        "/v1/messages/send",
        &json!({"from": OWNER, "to": CONTACT, "content": "hello"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["id"].as_str().unwrap().to_owned()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_send_persists_message_event_and_thread(pool: PgPool) {
    // Arrange / Act
    let id = send_message(&pool).await;

    // Assert
    let events: Vec<String> = sqlx::query("SELECT event_type FROM events ORDER BY event_type")
        .fetch_all(&pool)
        .await
        .unwrap()
        .iter()
        .map(|row| row.get("event_type"))
        .collect();
    assert_eq!(events, vec!["message.api.sent", "thread.updated"]);

    let (status, threads) = common::get_json(
        common::build_test_app(pool.clone()),
        &format!("/v1/message-threads?owner={}", query_phone(OWNER)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(threads[0]["last_message_id"], id.as_str());
    assert_eq!(threads[0]["status"], "pending");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_phone_lifecycle_reaches_delivered(pool: PgPool) {
    // Arrange
    let id = send_message(&pool).await;

    // Act
    let (status, outstanding) = common::get_json(
        common::build_test_app(pool.clone()),
        &format!("/v1/messages/outstanding?owner={}", query_phone(OWNER)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outstanding[0]["status"], "sending");

    for event_name in ["SENT", "DELIVERED"] {
        let (status, _) = common::post_json(
            common::build_test_app(pool.clone()),
            &format!("/v1/messages/{id}/events"),
            &json!({"event_name": event_name, "timestamp": "2026-01-15T10:01:00Z"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Assert
    let (status, messages) = common::get_json(
        common::build_test_app(pool.clone()),
        &format!(
            "/v1/messages?owner={}&contact={}",
            query_phone(OWNER),
            query_phone(CONTACT)
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages[0]["status"], "delivered");

    let (_, monitor) = common::get_json(
        common::build_test_app(pool.clone()),
        &format!("/v1/heartbeats/monitor?owner={}", query_phone(OWNER)),
    )
    .await;
    assert_eq!(monitor["owner"], OWNER);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_every_listener_run_is_logged_once(pool: PgPool) {
    // Arrange
    send_message(&pool).await;

    // Act
    common::get_json(
        common::build_test_app(pool.clone()),
        &format!("/v1/messages/outstanding?owner={}", query_phone(OWNER)),
    )
    .await;

    // Assert
    let rows = sqlx::query(
        "SELECT listener_name, status, COUNT(*) OVER (PARTITION BY event_id, listener_name) AS runs \
         FROM event_listener_logs",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(!rows.is_empty());
    for row in &rows {
        let status: String = row.get("status");
        let runs: i64 = row.get("runs");
        assert_eq!(status, "success");
        assert_eq!(runs, 1);
    }
    let names: Vec<String> = rows.iter().map(|row| row.get("listener_name")).collect();
    assert!(names.contains(&"mark-message-sending".to_owned()));
    assert!(names.contains(&"store-heartbeat-on-message-sending".to_owned()));
    assert!(names.contains(&"update-heartbeat-timestamp".to_owned()));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_phone_event_for_unknown_message_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let (status, json) = common::post_json(
        app,
        "/v1/messages/00000000-0000-0000-0000-000000000001/events",
        &json!({"event_name": "SENT", "timestamp": "2026-01-15T10:01:00Z"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
