//! Integration tests for `EventDispatcher`.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_events::{EventDispatcher, PublishError, SubscribeError, SubscriptionRegistry};
use httpsms_test_support::{
    FailingEventRepository, FixedClock, InMemoryEventRepository, Journal, ListenerBehavior,
    RecordingListener,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn heartbeat_event() -> Event {
    Event::new(
        EventType::HeartbeatReceived,
        "/v1/heartbeats",
        &json!({"owner": "+18005550199"}),
        &FixedClock::standard(),
    )
    .unwrap()
}

fn recording(name: &str, behavior: ListenerBehavior, journal: &Journal) -> Arc<RecordingListener> {
    Arc::new(RecordingListener::new(name, behavior, Arc::clone(journal)))
}

fn names(journal: &Journal) -> Vec<String> {
    journal
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect()
}

// --- subscription table ---

#[test]
fn test_subscribing_same_name_twice_to_one_type_is_rejected() {
    // Arrange
    let mut registry = SubscriptionRegistry::new();
    registry
        .subscribe(
            EventType::HeartbeatReceived,
            "update-heartbeat-timestamp",
            Arc::new(RecordingListener::succeeding("first")),
        )
        .unwrap();

    // Act
    let result = registry.subscribe(
        EventType::HeartbeatReceived,
        "update-heartbeat-timestamp",
        Arc::new(RecordingListener::succeeding("second")),
    );

    // Assert
    assert_eq!(
        result,
        Err(SubscribeError::DuplicateListener {
            event_type: EventType::HeartbeatReceived,
            listener_name: "update-heartbeat-timestamp".to_owned(),
        })
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_same_name_on_different_types_is_allowed() {
    let mut registry = SubscriptionRegistry::new();

    registry
        .subscribe(
            EventType::MessagePhoneSent,
            "audit",
            Arc::new(RecordingListener::succeeding("audit")),
        )
        .unwrap();
    registry
        .subscribe(
            EventType::MessagePhoneDelivered,
            "audit",
            Arc::new(RecordingListener::succeeding("audit")),
        )
        .unwrap();

    assert_eq!(registry.len(), 2);
}

#[test]
fn test_second_install_is_rejected() {
    let dispatcher = EventDispatcher::new(Arc::new(InMemoryEventRepository::new()));
    dispatcher.install(SubscriptionRegistry::new()).unwrap();

    let result = dispatcher.install(SubscriptionRegistry::new());

    assert_eq!(result, Err(SubscribeError::AlreadyInstalled));
    assert!(dispatcher.is_installed());
}

// --- publish ---

#[tokio::test]
async fn test_publish_without_subscribers_is_a_noop() {
    // Arrange
    let events = Arc::new(InMemoryEventRepository::new());
    let dispatcher = EventDispatcher::with_registry(events.clone(), SubscriptionRegistry::new());
    let event = heartbeat_event();

    // Act
    let result = dispatcher.publish(&CancellationToken::new(), &event).await;

    // Assert
    assert!(result.is_ok());
    assert_eq!(events.saved_events().len(), 1);
}

#[tokio::test]
async fn test_publish_before_install_is_a_noop() {
    let dispatcher = EventDispatcher::new(Arc::new(InMemoryEventRepository::new()));

    let result = dispatcher
        .publish(&CancellationToken::new(), &heartbeat_event())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_listeners_run_in_registration_order() {
    // Arrange
    let journal = Journal::default();
    let mut registry = SubscriptionRegistry::new();
    for name in ["first", "second", "third"] {
        registry
            .subscribe(
                EventType::HeartbeatReceived,
                name,
                recording(name, ListenerBehavior::Succeed, &journal),
            )
            .unwrap();
    }
    let dispatcher =
        EventDispatcher::with_registry(Arc::new(InMemoryEventRepository::new()), registry);

    // Act
    dispatcher
        .publish(&CancellationToken::new(), &heartbeat_event())
        .await
        .unwrap();

    // Assert
    assert_eq!(names(&journal), vec!["first", "second", "third"]);
    assert_eq!(
        dispatcher.listener_names(EventType::HeartbeatReceived),
        vec!["first", "second", "third"]
    );
}

#[tokio::test]
async fn test_failing_and_panicking_listeners_do_not_stop_the_others() {
    // Arrange
    let journal = Journal::default();
    let mut registry = SubscriptionRegistry::new();
    registry
        .subscribe(
            EventType::HeartbeatReceived,
            "a",
            recording("a", ListenerBehavior::Fail, &journal),
        )
        .unwrap();
    registry
        .subscribe(
            EventType::HeartbeatReceived,
            "b",
            recording("b", ListenerBehavior::Panic, &journal),
        )
        .unwrap();
    let c = recording("c", ListenerBehavior::Succeed, &journal);
    registry
        .subscribe(EventType::HeartbeatReceived, "c", c.clone())
        .unwrap();
    let dispatcher =
        EventDispatcher::with_registry(Arc::new(InMemoryEventRepository::new()), registry);
    let event = heartbeat_event();

    // Act
    let result = dispatcher.publish(&CancellationToken::new(), &event).await;

    // Assert
    assert_eq!(c.calls(), 1);
    assert_eq!(names(&journal), vec!["a", "b", "c"]);
    match result {
        Err(PublishError::Listeners { event_id, failures }) => {
            assert_eq!(event_id, event.id());
            let failed: Vec<&str> = failures.iter().map(|f| f.listener_name.as_str()).collect();
            assert_eq!(failed, vec!["a", "b"]);
            assert!(failures[1].error.to_string().contains("b panicked"));
        }
        other => panic!("expected listener failures, got {other:?}"),
    }
}

#[tokio::test]
async fn test_store_failure_runs_no_listener() {
    // Arrange
    let listener = Arc::new(RecordingListener::succeeding("never"));
    let mut registry = SubscriptionRegistry::new();
    registry
        .subscribe(EventType::HeartbeatReceived, "never", listener.clone())
        .unwrap();
    let dispatcher = EventDispatcher::with_registry(Arc::new(FailingEventRepository), registry);

    // Act
    let result = dispatcher
        .publish(&CancellationToken::new(), &heartbeat_event())
        .await;

    // Assert
    assert!(matches!(result, Err(PublishError::Store { .. })));
    assert_eq!(listener.calls(), 0);
}

#[tokio::test]
async fn test_cancelled_publish_skips_unstarted_listeners() {
    // Arrange
    let listener = Arc::new(RecordingListener::succeeding("skipped"));
    let mut registry = SubscriptionRegistry::new();
    registry
        .subscribe(EventType::HeartbeatReceived, "skipped", listener.clone())
        .unwrap();
    let dispatcher =
        EventDispatcher::with_registry(Arc::new(InMemoryEventRepository::new()), registry);
    let cancel = CancellationToken::new();
    cancel.cancel();

    // Act
    let result = dispatcher.publish(&cancel, &heartbeat_event()).await;

    // Assert
    assert_eq!(listener.calls(), 0);
    match result {
        Err(PublishError::Listeners { failures, .. }) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].listener_name, "skipped");
            assert!(matches!(failures[0].error, DomainError::Cancelled));
        }
        other => panic!("expected a cancelled listener, got {other:?}"),
    }
}

#[tokio::test]
async fn test_redelivered_event_is_stored_once() {
    let events = Arc::new(InMemoryEventRepository::new());
    let dispatcher = EventDispatcher::with_registry(events.clone(), SubscriptionRegistry::new());
    let event = heartbeat_event();

    dispatcher
        .publish(&CancellationToken::new(), &event)
        .await
        .unwrap();
    dispatcher
        .publish(&CancellationToken::new(), &event)
        .await
        .unwrap();

    assert_eq!(events.saved_events().len(), 1);
    assert_eq!(events.saved_events()[0].occurred_at(), FixedClock::standard().now());
}

#[test]
fn test_tolerating_listener_failures_keeps_store_errors() {
    let store = PublishError::Store {
        event_id: heartbeat_event().id(),
        source: DomainError::Infrastructure("down".into()),
    };
    let listeners = PublishError::Listeners {
        event_id: heartbeat_event().id(),
        failures: Vec::new(),
    };

    assert!(store.tolerate_listener_failures().is_err());
    assert!(listeners.tolerate_listener_failures().is_ok());
}
