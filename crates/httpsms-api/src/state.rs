//! Shared application state.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_heartbeat::application::service::HeartbeatService;
use httpsms_message::application::service::MessageService;
use httpsms_message_thread::application::service::MessageThreadService;
use tokio_util::sync::CancellationToken;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Message operations.
    pub message_service: Arc<MessageService>,
    /// Message thread operations.
    pub thread_service: Arc<MessageThreadService>,
    /// Heartbeat operations.
    pub heartbeat_service: Arc<HeartbeatService>,
    /// Time source for request timestamps.
    pub clock: Arc<dyn Clock>,
    /// Cancelled when the server shuts down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        message_service: Arc<MessageService>,
        thread_service: Arc<MessageThreadService>,
        heartbeat_service: Arc<HeartbeatService>,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            message_service,
            thread_service,
            heartbeat_service,
            clock,
            shutdown,
        }
    }

    /// A token for one request, cancelled with the server.
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
