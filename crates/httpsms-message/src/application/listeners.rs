//! Message listener group: applies phone status reports to stored messages.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventListenerLogRepository;
use httpsms_events::{ListenerFuture, ListenerRoutes, Subscription};
use tokio_util::sync::CancellationToken;

use crate::application::service::MessageService;
use crate::domain::events::{MessagePhoneStatus, MessageSendFailed};

/// Listener name for `message.phone.sending`.
pub const MARK_MESSAGE_SENDING: &str = "mark-message-sending";
/// Listener name for `message.phone.sent`.
pub const MARK_MESSAGE_SENT: &str = "mark-message-sent";
/// Listener name for `message.phone.delivered`.
pub const MARK_MESSAGE_DELIVERED: &str = "mark-message-delivered";
/// Listener name for `message.send.failed`.
pub const MARK_MESSAGE_FAILED: &str = "mark-message-failed";

/// Listeners bound to the [`MessageService`].
pub struct MessageListener {
    service: Arc<MessageService>,
    logs: Arc<dyn EventListenerLogRepository>,
    clock: Arc<dyn Clock>,
}

impl MessageListener {
    /// Creates the listener group.
    #[must_use]
    pub fn new(
        service: Arc<MessageService>,
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
                EventType::MessagePhoneSending,
                MARK_MESSAGE_SENDING,
                &group,
                Self::on_phone_sending,
            )
            .route(
                EventType::MessagePhoneSent,
                MARK_MESSAGE_SENT,
                &group,
                Self::on_phone_sent,
            )
            .route(
                EventType::MessagePhoneDelivered,
                MARK_MESSAGE_DELIVERED,
                &group,
                Self::on_phone_delivered,
            )
            .route(
                EventType::MessageSendFailed,
                MARK_MESSAGE_FAILED,
                &group,
                Self::on_send_failed,
            )
            .into_subscriptions()
    }

    fn on_phone_sending<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            self.service.apply_phone_sending(&payload).await
        })
    }

    fn on_phone_sent<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            self.service.apply_phone_sent(&payload).await
        })
    }

    fn on_phone_delivered<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            self.service.apply_phone_delivered(&payload).await
        })
    }

    fn on_send_failed<'a>(
        &'a self,
        _cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessageSendFailed = event.payload_as()?;
            self.service.apply_send_failed(&payload).await
        })
    }
}
