//! Message thread listener group: keeps threads in step with message events.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventListenerLogRepository;
use httpsms_events::{ListenerFuture, ListenerRoutes, Subscription};
use httpsms_message::domain::events::{
    MessageApiSent, MessagePhoneReceived, MessagePhoneStatus, MessageSendFailed,
};
use httpsms_message::domain::message::MessageStatus;
use tokio_util::sync::CancellationToken;

use crate::application::service::MessageThreadService;
use crate::domain::thread::ThreadActivity;

/// Listener name for `message.api.sent`.
pub const UPDATE_THREAD_ON_API_SENT: &str = "update-thread-on-message-api-sent";
/// Listener name for `message.phone.sent`.
pub const UPDATE_THREAD_ON_PHONE_SENT: &str = "update-thread-on-message-phone-sent";
/// Listener name for `message.phone.delivered`.
pub const UPDATE_THREAD_ON_PHONE_DELIVERED: &str = "update-thread-on-message-phone-delivered";
/// Listener name for `message.send.failed`.
pub const UPDATE_THREAD_ON_SEND_FAILED: &str = "update-thread-on-message-send-failed";
/// Listener name for `message.phone.received`.
pub const UPDATE_THREAD_ON_PHONE_RECEIVED: &str = "update-thread-on-message-phone-received";

/// Listeners bound to the [`MessageThreadService`].
pub struct MessageThreadListener {
    service: Arc<MessageThreadService>,
    logs: Arc<dyn EventListenerLogRepository>,
    clock: Arc<dyn Clock>,
}

impl MessageThreadListener {
    /// Creates the listener group.
    #[must_use]
    pub fn new(
        service: Arc<MessageThreadService>,
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
                EventType::MessageApiSent,
                UPDATE_THREAD_ON_API_SENT,
                &group,
                Self::on_api_sent,
            )
            .route(
                EventType::MessagePhoneSent,
                UPDATE_THREAD_ON_PHONE_SENT,
                &group,
                Self::on_phone_sent,
            )
            .route(
                EventType::MessagePhoneDelivered,
                UPDATE_THREAD_ON_PHONE_DELIVERED,
                &group,
                Self::on_phone_delivered,
            )
            .route(
                EventType::MessageSendFailed,
                UPDATE_THREAD_ON_SEND_FAILED,
                &group,
                Self::on_send_failed,
            )
            .route(
                EventType::MessagePhoneReceived,
                UPDATE_THREAD_ON_PHONE_RECEIVED,
                &group,
                Self::on_phone_received,
            )
            .into_subscriptions()
    }

    fn on_api_sent<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessageApiSent = event.payload_as()?;
            let activity = ThreadActivity {
                owner: payload.owner,
                contact: payload.contact,
                message_id: payload.message_id,
                content: payload.content,
                status: MessageStatus::Pending,
                timestamp: payload.request_received_at,
            };
            self.service.update_thread(cancel, &activity).await
        })
    }

    fn on_phone_sent<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            let activity = status_activity(payload, MessageStatus::Sent);
            self.service.update_thread(cancel, &activity).await
        })
    }

    fn on_phone_delivered<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneStatus = event.payload_as()?;
            let activity = status_activity(payload, MessageStatus::Delivered);
            self.service.update_thread(cancel, &activity).await
        })
    }

    fn on_send_failed<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessageSendFailed = event.payload_as()?;
            let activity = ThreadActivity {
                owner: payload.owner,
                contact: payload.contact,
                message_id: payload.message_id,
                content: payload.content,
                status: MessageStatus::Failed,
                timestamp: payload.order_timestamp,
            };
            self.service.update_thread(cancel, &activity).await
        })
    }

    fn on_phone_received<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: &'a Event,
    ) -> ListenerFuture<'a> {
        Box::pin(async move {
            let payload: MessagePhoneReceived = event.payload_as()?;
            let activity = ThreadActivity {
                owner: payload.owner,
                contact: payload.contact,
                message_id: payload.message_id,
                content: payload.content,
                status: MessageStatus::Received,
                timestamp: payload.timestamp,
            };
            self.service.update_thread(cancel, &activity).await
        })
    }
}

fn status_activity(payload: MessagePhoneStatus, status: MessageStatus) -> ThreadActivity {
    ThreadActivity {
        owner: payload.owner,
        contact: payload.contact,
        message_id: payload.message_id,
        content: payload.content,
        status,
        timestamp: payload.order_timestamp,
    }
}
