//! Integration tests for `MessageService` wired to every listener group.

use chrono::{DateTime, Duration, Utc};
use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::EventType;
use httpsms_core::listener_log::ListenerStatus;
use httpsms_message::domain::commands::{
    GetOutstanding, MessageIndex, PhoneEventName, ReceiveMessage, SendMessage, StorePhoneEvent,
};
use httpsms_message::domain::message::{Message, MessageStatus, MessageType};
use httpsms_test_support::InMemoryApp;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const OWNER: &str = "+18005550199";
const CONTACT: &str = "+18005550100";

fn now(app: &InMemoryApp) -> DateTime<Utc> {
    app.clock.now()
}

async fn send(app: &InMemoryApp, content: &str, at: DateTime<Utc>) -> Message {
    app.message_service
        .send_message(
            &CancellationToken::new(),
            &SendMessage {
                owner: OWNER.to_owned(),
                contact: CONTACT.to_owned(),
                content: content.to_owned(),
                request_received_at: at,
            },
        )
        .await
        .unwrap()
}

async fn report(
    app: &InMemoryApp,
    message_id: Uuid,
    event_name: PhoneEventName,
    reason: Option<&str>,
) -> Result<Message, DomainError> {
    app.message_service
        .store_phone_event(
            &CancellationToken::new(),
            &StorePhoneEvent {
                message_id,
                event_name,
                timestamp: now(app),
                reason: reason.map(str::to_owned),
            },
        )
        .await
}

#[tokio::test]
async fn test_send_message_stores_pending_message_and_publishes_api_sent() {
    // Arrange
    let app = InMemoryApp::new();

    // Act
    let message = send(&app, "hello", now(&app)).await;

    // Assert
    assert_eq!(message.status, MessageStatus::Pending);
    assert_eq!(message.kind, MessageType::MobileTerminated);
    assert_eq!(app.messages.get(message.id), Some(message.clone()));
    let topics: Vec<EventType> = app
        .events
        .saved_events()
        .iter()
        .map(httpsms_core::event::Event::event_type)
        .collect();
    assert_eq!(topics, vec![EventType::MessageApiSent, EventType::ThreadUpdated]);
}

#[tokio::test]
async fn test_outstanding_marks_messages_sending_and_counts_as_heartbeat() {
    // Arrange
    let app = InMemoryApp::new();
    let older = send(&app, "first", now(&app) - Duration::minutes(2)).await;
    let newer = send(&app, "second", now(&app) - Duration::minutes(1)).await;

    // Act
    let handed_out = app
        .message_service
        .get_outstanding(
            &CancellationToken::new(),
            &GetOutstanding {
                owner: OWNER.to_owned(),
                limit: 10,
            },
        )
        .await
        .unwrap();

    // Assert
    let ids: Vec<Uuid> = handed_out.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);
    assert!(handed_out.iter().all(|m| m.status == MessageStatus::Sending));
    assert!(handed_out.iter().all(|m| m.last_attempted_at.is_some()));
    assert_eq!(app.heartbeats.all().len(), 2);
    let monitor = app.heartbeat_service.monitor(OWNER).await.unwrap();
    assert_eq!(monitor.last_heartbeat_at, now(&app));
}

#[tokio::test]
async fn test_outstanding_respects_limit() {
    let app = InMemoryApp::new();
    send(&app, "first", now(&app) - Duration::minutes(2)).await;
    send(&app, "second", now(&app) - Duration::minutes(1)).await;

    let handed_out = app
        .message_service
        .get_outstanding(
            &CancellationToken::new(),
            &GetOutstanding {
                owner: OWNER.to_owned(),
                limit: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(handed_out.len(), 1);
    assert_eq!(handed_out[0].content, "first");
}

#[tokio::test]
async fn test_phone_reports_move_message_to_delivered() {
    // Arrange
    let app = InMemoryApp::new();
    let message = send(&app, "hello", now(&app)).await;

    // Act
    let sent = report(&app, message.id, PhoneEventName::Sent, None)
        .await
        .unwrap();
    let delivered = report(&app, message.id, PhoneEventName::Delivered, None)
        .await
        .unwrap();

    // Assert
    assert_eq!(sent.status, MessageStatus::Sent);
    assert_eq!(delivered.status, MessageStatus::Delivered);
    assert!(delivered.sent_at.is_some());
    assert!(delivered.delivered_at.is_some());
}

#[tokio::test]
async fn test_failed_report_records_reason() {
    let app = InMemoryApp::new();
    let message = send(&app, "hello", now(&app)).await;

    let failed = report(&app, message.id, PhoneEventName::Failed, Some("no signal"))
        .await
        .unwrap();

    assert_eq!(failed.status, MessageStatus::Failed);
    assert_eq!(failed.failure_reason.as_deref(), Some("no signal"));
}

#[tokio::test]
async fn test_late_report_on_terminal_message_is_ignored() {
    // Arrange
    let app = InMemoryApp::new();
    let message = send(&app, "hello", now(&app)).await;
    report(&app, message.id, PhoneEventName::Delivered, None)
        .await
        .unwrap();

    // Act
    let after = report(&app, message.id, PhoneEventName::Sent, None)
        .await
        .unwrap();

    // Assert
    assert_eq!(after.status, MessageStatus::Delivered);
    assert_eq!(after.sent_at, None);
    let sent_event = app
        .events
        .saved_events()
        .into_iter()
        .find(|e| e.event_type() == EventType::MessagePhoneSent)
        .unwrap();
    let log = app.logs.get(sent_event.id(), "mark-message-sent").unwrap();
    assert_eq!(log.status, ListenerStatus::Success);
}

#[tokio::test]
async fn test_report_for_unknown_message_is_not_found() {
    let app = InMemoryApp::new();

    let result = report(&app, Uuid::new_v4(), PhoneEventName::Sent, None).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
    assert!(app.events.saved_events().is_empty());
}

#[tokio::test]
async fn test_receive_message_stores_inbound_message() {
    let app = InMemoryApp::new();

    let message = app
        .message_service
        .receive_message(
            &CancellationToken::new(),
            &ReceiveMessage {
                owner: OWNER.to_owned(),
                contact: CONTACT.to_owned(),
                content: "hi back".to_owned(),
                timestamp: now(&app),
            },
        )
        .await
        .unwrap();

    assert_eq!(message.status, MessageStatus::Received);
    assert_eq!(message.kind, MessageType::MobileOriginated);
    assert_eq!(app.messages.all().len(), 1);
}

#[tokio::test]
async fn test_index_pages_conversation_newest_first() {
    // Arrange
    let app = InMemoryApp::new();
    for minutes in [3, 2, 1] {
        send(
            &app,
            &format!("{minutes} minutes ago"),
            now(&app) - Duration::minutes(minutes),
        )
        .await;
    }

    // Act
    let page = app
        .message_service
        .index(&MessageIndex {
            owner: OWNER.to_owned(),
            contact: CONTACT.to_owned(),
            skip: 1,
            limit: 2,
        })
        .await
        .unwrap();

    // Assert
    let contents: Vec<&str> = page.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["2 minutes ago", "3 minutes ago"]);
}

#[tokio::test]
async fn test_redelivered_sent_event_does_not_repeat_side_effects() {
    // Arrange
    let app = InMemoryApp::new();
    let message = send(&app, "hello", now(&app)).await;
    report(&app, message.id, PhoneEventName::Sent, None)
        .await
        .unwrap();
    let sent_event = app
        .events
        .saved_events()
        .into_iter()
        .find(|e| e.event_type() == EventType::MessagePhoneSent)
        .unwrap();
    let saves_before = app.logs.saves().len();

    // Act
    app.dispatcher
        .publish(&CancellationToken::new(), &sent_event)
        .await
        .unwrap();

    // Assert
    assert_eq!(app.logs.saves().len(), saves_before);
    assert_eq!(
        app.messages.get(message.id).unwrap().status,
        MessageStatus::Sent
    );
}
