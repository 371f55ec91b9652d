//! Fully wired in-memory application for service and route tests.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_events::{EventDispatcher, SubscriptionRegistry};
use httpsms_heartbeat::application::listeners::HeartbeatListener;
use httpsms_heartbeat::application::service::HeartbeatService;
use httpsms_message::application::listeners::MessageListener;
use httpsms_message::application::service::MessageService;
use httpsms_message_thread::application::listeners::MessageThreadListener;
use httpsms_message_thread::application::service::MessageThreadService;

use crate::clock::FixedClock;
use crate::heartbeat::InMemoryHeartbeatRepository;
use crate::message::InMemoryMessageRepository;
use crate::repository::{InMemoryEventListenerLogRepository, InMemoryEventRepository};
use crate::thread::InMemoryMessageThreadRepository;

/// Services, listener groups and in-memory stores wired the same way as the
/// production container.
pub struct InMemoryApp {
    /// The clock every component reads.
    pub clock: Arc<FixedClock>,
    /// Every published event.
    pub events: Arc<InMemoryEventRepository>,
    /// Listener outcomes per event.
    pub logs: Arc<InMemoryEventListenerLogRepository>,
    /// Stored messages.
    pub messages: Arc<InMemoryMessageRepository>,
    /// Stored threads.
    pub threads: Arc<InMemoryMessageThreadRepository>,
    /// Stored heartbeats and monitors.
    pub heartbeats: Arc<InMemoryHeartbeatRepository>,
    /// The dispatcher with all listener groups installed.
    pub dispatcher: Arc<EventDispatcher>,
    /// Message use cases.
    pub message_service: Arc<MessageService>,
    /// Thread use cases.
    pub thread_service: Arc<MessageThreadService>,
    /// Heartbeat use cases.
    pub heartbeat_service: Arc<HeartbeatService>,
}

impl InMemoryApp {
    /// Builds the application at [`FixedClock::standard`].
    ///
    /// # Panics
    ///
    /// Panics if two listener groups register the same name for one event
    /// type.
    #[must_use]
    pub fn new() -> Self {
        Self::at(FixedClock::standard())
    }

    /// Builds the application at a given clock.
    ///
    /// # Panics
    ///
    /// Panics if two listener groups register the same name for one event
    /// type.
    #[must_use]
    pub fn at(clock: FixedClock) -> Self {
        let clock = Arc::new(clock);
        let events = Arc::new(InMemoryEventRepository::new());
        let logs = Arc::new(InMemoryEventListenerLogRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());
        let threads = Arc::new(InMemoryMessageThreadRepository::new());
        let heartbeats = Arc::new(InMemoryHeartbeatRepository::new());
        let dispatcher = Arc::new(EventDispatcher::new(events.clone()));

        let shared_clock: Arc<dyn Clock> = clock.clone();
        let message_service = Arc::new(MessageService::new(
            messages.clone(),
            Arc::clone(&dispatcher),
            Arc::clone(&shared_clock),
        ));
        let thread_service = Arc::new(MessageThreadService::new(
            threads.clone(),
            Arc::clone(&dispatcher),
            Arc::clone(&shared_clock),
        ));
        let heartbeat_service = Arc::new(HeartbeatService::new(
            heartbeats.clone(),
            Arc::clone(&dispatcher),
            Arc::clone(&shared_clock),
        ));

        let mut registry = SubscriptionRegistry::new();
        registry
            .register(
                MessageListener::new(
                    Arc::clone(&message_service),
                    logs.clone(),
                    Arc::clone(&shared_clock),
                )
                .into_subscriptions(),
            )
            .unwrap();
        registry
            .register(
                MessageThreadListener::new(
                    Arc::clone(&thread_service),
                    logs.clone(),
                    Arc::clone(&shared_clock),
                )
                .into_subscriptions(),
            )
            .unwrap();
        registry
            .register(
                HeartbeatListener::new(
                    Arc::clone(&heartbeat_service),
                    logs.clone(),
                    Arc::clone(&shared_clock),
                )
                .into_subscriptions(),
            )
            .unwrap();
        dispatcher.install(registry).unwrap();

        Self {
            clock,
            events,
            logs,
            messages,
            threads,
            heartbeats,
            dispatcher,
            message_service,
            thread_service,
            heartbeat_service,
        }
    }
}

impl Default for InMemoryApp {
    fn default() -> Self {
        Self::new()
    }
}
