//! Composition root: builds repositories, the dispatcher, services and
//! listener groups, then exposes the HTTP router.

use std::sync::Arc;

use axum::Router;
use httpsms_core::clock::Clock;
use httpsms_core::repository::EventListenerLogRepository;
use httpsms_events::{EventDispatcher, SubscriptionRegistry};
use httpsms_heartbeat::application::listeners::HeartbeatListener;
use httpsms_heartbeat::application::service::HeartbeatService;
use httpsms_message::application::listeners::MessageListener;
use httpsms_message::application::service::MessageService;
use httpsms_message_thread::application::listeners::MessageThreadListener;
use httpsms_message_thread::application::service::MessageThreadService;
use httpsms_store::pg_event_listener_log_repository::PgEventListenerLogRepository;
use httpsms_store::pg_event_repository::PgEventRepository;
use httpsms_store::pg_heartbeat_repository::PgHeartbeatRepository;
use httpsms_store::pg_message_repository::PgMessageRepository;
use httpsms_store::pg_message_thread_repository::PgMessageThreadRepository;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// The wired application.
pub struct Container {
    dispatcher: Arc<EventDispatcher>,
    message_service: Arc<MessageService>,
    thread_service: Arc<MessageThreadService>,
    heartbeat_service: Arc<HeartbeatService>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    http_logger: bool,
}

impl Container {
    /// Wires every component against `pool`.
    ///
    /// The dispatcher is shared by the services before its subscription
    /// table exists; the table is installed once all listener groups have
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if two listeners share a name on one event
    /// type.
    pub fn build(
        config: &Config,
        pool: PgPool,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Result<Self, AppError> {
        let events = Arc::new(PgEventRepository::new(pool.clone()));
        let logs: Arc<dyn EventListenerLogRepository> =
            Arc::new(PgEventListenerLogRepository::new(pool.clone()));
        let messages = Arc::new(PgMessageRepository::new(pool.clone()));
        let threads = Arc::new(PgMessageThreadRepository::new(pool.clone()));
        let heartbeats = Arc::new(PgHeartbeatRepository::new(pool));

        let dispatcher = Arc::new(EventDispatcher::new(events));

        let message_service = Arc::new(MessageService::new(
            messages,
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
        ));
        let thread_service = Arc::new(MessageThreadService::new(
            threads,
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
        ));
        let heartbeat_service = Arc::new(HeartbeatService::new(
            heartbeats,
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
        ));

        let mut registry = SubscriptionRegistry::new();
        registry.register(
            MessageListener::new(
                Arc::clone(&message_service),
                Arc::clone(&logs),
                Arc::clone(&clock),
            )
            .into_subscriptions(),
        )?;
        registry.register(
            MessageThreadListener::new(
                Arc::clone(&thread_service),
                Arc::clone(&logs),
                Arc::clone(&clock),
            )
            .into_subscriptions(),
        )?;
        registry.register(
            HeartbeatListener::new(
                Arc::clone(&heartbeat_service),
                Arc::clone(&logs),
                Arc::clone(&clock),
            )
            .into_subscriptions(),
        )?;
        let subscriptions = registry.len();
        dispatcher.install(registry)?;
        info!(subscriptions, "event listeners registered");

        Ok(Self {
            dispatcher,
            message_service,
            thread_service,
            heartbeat_service,
            clock,
            shutdown,
            http_logger: config.http_logger,
        })
    }

    /// The shared event dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// The message service.
    #[must_use]
    pub fn message_service(&self) -> Arc<MessageService> {
        Arc::clone(&self.message_service)
    }

    /// The message thread service.
    #[must_use]
    pub fn thread_service(&self) -> Arc<MessageThreadService> {
        Arc::clone(&self.thread_service)
    }

    /// The heartbeat service.
    #[must_use]
    pub fn heartbeat_service(&self) -> Arc<HeartbeatService> {
        Arc::clone(&self.heartbeat_service)
    }

    /// State handed to the route handlers.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(
            self.message_service(),
            self.thread_service(),
            self.heartbeat_service(),
            Arc::clone(&self.clock),
            self.shutdown.clone(),
        )
    }

    /// The HTTP router. Unknown routes answer 404 with a pointer to `/docs`.
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = routes::api()
            .merge(routes::docs::router())
            .fallback(routes::docs::not_found)
            .layer(CorsLayer::permissive());
        if self.http_logger {
            router = router.layer(TraceLayer::new_for_http());
        }
        router.with_state(self.app_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use httpsms_core::clock::SystemClock;
    use httpsms_core::event::EventType;
    use httpsms_heartbeat::application::listeners::{
        STORE_HEARTBEAT_ON_MESSAGE_SENDING, UPDATE_HEARTBEAT_TIMESTAMP,
    };
    use httpsms_message::application::listeners::{MARK_MESSAGE_DELIVERED, MARK_MESSAGE_SENDING};
    use httpsms_message_thread::application::listeners::{
        UPDATE_THREAD_ON_API_SENT, UPDATE_THREAD_ON_PHONE_DELIVERED,
    };
    use serde_json::json;
    use sqlx::postgres::PgPoolOptions;

    use crate::routes::testing::call;

    fn config() -> Config {
        Config {
            database_url: "postgres://localhost/httpsms".to_owned(),
            host: "127.0.0.1".to_owned(),
            port: 8000,
            app_env: "local".to_owned(),
            http_logger: false,
            database_max_connections: 1,
            otlp_endpoint: None,
            service_name: "httpsms-api".to_owned(),
        }
    }

    fn container() -> Container {
        let config = config();
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)
            .unwrap();
        Container::build(
            &config,
            pool,
            Arc::new(SystemClock),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_listeners_are_registered_in_group_order() {
        // Arrange
        let container = container();
        let dispatcher = container.dispatcher();

        // Act
        let sending = dispatcher.listener_names(EventType::MessagePhoneSending);
        let delivered = dispatcher.listener_names(EventType::MessagePhoneDelivered);
        let api_sent = dispatcher.listener_names(EventType::MessageApiSent);
        let heartbeat = dispatcher.listener_names(EventType::HeartbeatReceived);

        // Assert
        assert_eq!(
            sending,
            vec![MARK_MESSAGE_SENDING, STORE_HEARTBEAT_ON_MESSAGE_SENDING]
        );
        assert_eq!(
            delivered,
            vec![MARK_MESSAGE_DELIVERED, UPDATE_THREAD_ON_PHONE_DELIVERED]
        );
        assert_eq!(api_sent, vec![UPDATE_THREAD_ON_API_SENT]);
        assert_eq!(heartbeat, vec![UPDATE_HEARTBEAT_TIMESTAMP]);
        assert!(dispatcher.listener_names(EventType::ThreadUpdated).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_points_to_docs() {
        let (status, json) = call(container().router(), "GET", "/v1/unknown", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
        assert!(json["message"].as_str().unwrap().contains("/docs"));
    }

    #[tokio::test]
    async fn test_docs_are_served() {
        let (status, json) = call(
            container().router(),
            "GET",
            routes::docs::OPENAPI_JSON,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["info"]["title"], "httpsms API");
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_storage() {
        let body = json!({"from": "+18005550199", "to": "+18005550100", "content": "  "});

        let (status, json) =
            call(container().router(), "POST", "/v1/messages/send", Some(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }
}
