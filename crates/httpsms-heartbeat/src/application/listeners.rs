//! Heartbeat listener group.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventListenerLogRepository;
use httpsms_events::{ListenerFuture, ListenerRoutes, Subscription};
use httpsms_message::domain::events::MessagePhoneStatus;
use tokio_util::sync::CancellationToken;

use crate::application::service::HeartbeatService;
use crate::domain::commands::StoreHeartbeat;
use crate::domain::events::HeartbeatReceived;

/// Listener name for `heartbeat.received`.
pub const UPDATE_HEARTBEAT_TIMESTAMP: &str = "update-heartbeat-timestamp";
/// Listener name for `message.phone.sending`.
pub const STORE_HEARTBEAT_ON_MESSAGE_SENDING: &str = "store-heartbeat-on-message-sending";

/// Listeners bound to the [`HeartbeatService`].
pub struct HeartbeatListener {
    service: Arc<HeartbeatService>,
    logs: Arc<dyn EventListenerLogRepository>,
    clock: Arc<dyn Clock>,
}

impl HeartbeatListener {
    /// Creates the listener group.
    #[must_use]
    pub fn new(
        service: Arc<HeartbeatService>,
        logs: Arc<dyn EventListenerLogRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service,
            logs,
            clock,
        }
    }

    /// The group's subscriptions, each guarded by the listener log.
    #[must_use]
    pub fn into_subscriptions(self) -> Vec<Subscription> {
        let routes = ListenerRoutes::new(Arc::clone(&self.logs), Arc::clone(&self.clock));
        let group = Arc::new(self);
        routes
            .route(
                EventType::HeartbeatReceived,
                UPDATE_HEARTBEAT_TIMESTAMP,
                &group,
                Self::on_heartbeat_received,
            )
            .route(
                EventType::MessagePhoneSending,
                STORE_HEARTBEAT_ON_MESSAGE_SENDING,
                &group,
                Self::on_message_sending,
            )
            .into_subscriptions()
    }

    fn on_heartbeat_received<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: HeartbeatReceived = event.payload_as()?;
            self.service.apply_heartbeat_received(&payload).await
        })
    }

    // a phone fetching outstanding messages is alive
    fn on_message_sending<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            let command = StoreHeartbeat {
                owner: payload.owner,
                timestamp: payload.timestamp,
            };
            self.service.store(cancel, &command).await.map(|_| ())
        })
    }
}
