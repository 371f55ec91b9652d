//! Message service.
//!
//! Request-facing operations persist first and then publish an event. The
//! `apply_*` operations are the side effects run by [`super::listeners`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_events::EventDispatcher;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::{
    GetOutstanding, MessageIndex, PhoneEventName, ReceiveMessage, SendMessage, StorePhoneEvent,
};
use crate::domain::events::{
    MessageApiSent, MessagePhoneReceived, MessagePhoneStatus, MessageSendFailed,
};
use crate::domain::message::Message;
use crate::domain::repository::MessageRepository;

const SOURCE_SEND: &str = "/v1/messages/send";
const SOURCE_RECEIVE: &str = "/v1/messages/receive";
const SOURCE_OUTSTANDING: &str = "/v1/messages/outstanding";
const SOURCE_PHONE_EVENTS: &str = "/v1/messages/{id}/events";

/// Operations on messages.
pub struct MessageService {
    repository: Arc<dyn MessageRepository>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl MessageService {
    /// Creates a new `MessageService`.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// Stores a pending outgoing message and publishes `message.api.sent`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message or the event cannot be stored.
    #[instrument(skip_all, fields(owner = %command.owner))]
    pub async fn send_message(
        &self,
        cancel: &CancellationToken,
        command: &SendMessage,
    ) -> Result<Message, DomainError> {
        let message = Message::outgoing(
            command.owner.clone(),
            command.contact.clone(),
            command.content.clone(),
            command.request_received_at,
            self.clock.now(),
        );
        self.repository.store(&message).await?;

        let payload = MessageApiSent {
            message_id: message.id,
            owner: message.owner.clone(),
            contact: message.contact.clone(),
            content: message.content.clone(),
            request_received_at: message.request_received_at,
        };
        self.publish(cancel, EventType::MessageApiSent, SOURCE_SEND, &payload)
            .await?;

        info!(message_id = %message.id, "message queued for phone");
        Ok(message)
    }

    /// Stores an inbound message and publishes `message.phone.received`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message or the event cannot be stored.
    #[instrument(skip_all, fields(owner = %command.owner))]
    pub async fn receive_message(
        &self,
        cancel: &CancellationToken,
        command: &ReceiveMessage,
    ) -> Result<Message, DomainError> {
        let message = Message::incoming(
            command.owner.clone(),
            command.contact.clone(),
            command.content.clone(),
            command.timestamp,
            self.clock.now(),
        );
        self.repository.store(&message).await?;

        let payload = MessagePhoneReceived {
            message_id: message.id,
            owner: message.owner.clone(),
            contact: message.contact.clone(),
            content: message.content.clone(),
            timestamp: command.timestamp,
        };
        self.publish(
            cancel,
            EventType::MessagePhoneReceived,
            SOURCE_RECEIVE,
            &payload,
        )
        .await?;

        info!(message_id = %message.id, "inbound message stored");
        Ok(message)
    }

    /// Hands pending messages to the phone, publishing
    /// `message.phone.sending` for each, and returns them as stored after the
    /// listeners ran.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if loading messages or storing an event fails.
    #[instrument(skip_all, fields(owner = %command.owner, limit = command.limit))]
    pub async fn get_outstanding(
        &self,
        cancel: &CancellationToken,
        command: &GetOutstanding,
    ) -> Result<Vec<Message>, DomainError> {
        let pending = self
            .repository
            .outstanding(&command.owner, command.limit)
            .await?;

        let mut handed_out = Vec::with_capacity(pending.len());
        for message in pending {
            let payload = MessagePhoneStatus {
                message_id: message.id,
                owner: message.owner.clone(),
                contact: message.contact.clone(),
                content: message.content.clone(),
                timestamp: self.clock.now(),
                order_timestamp: message.order_timestamp,
            };
            self.publish(
                cancel,
                EventType::MessagePhoneSending,
                SOURCE_OUTSTANDING,
                &payload,
            )
            .await?;

            let refreshed = self.repository.load(message.id).await?;
            handed_out.push(refreshed.unwrap_or(message));
        }

        debug!(count = handed_out.len(), "outstanding messages handed to phone");
        Ok(handed_out)
    }

    /// Publishes the phone's status report about a message.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown message, or a
    /// `DomainError` if the event cannot be stored.
    #[instrument(skip_all, fields(message_id = %command.message_id, event = ?command.event_name))]
    pub async fn store_phone_event(
        &self,
        cancel: &CancellationToken,
        command: &StorePhoneEvent,
    ) -> Result<Message, DomainError> {
        let message = self.load(command.message_id).await?;

        match command.event_name {
            PhoneEventName::Sent | PhoneEventName::Delivered => {
                let event_type = if command.event_name == PhoneEventName::Sent {
                    EventType::MessagePhoneSent
                } else {
                    EventType::MessagePhoneDelivered
                };
                let payload = MessagePhoneStatus {
                    message_id: message.id,
                    owner: message.owner.clone(),
                    contact: message.contact.clone(),
                    content: message.content.clone(),
                    timestamp: command.timestamp,
                    order_timestamp: message.order_timestamp,
                };
                self.publish(cancel, event_type, SOURCE_PHONE_EVENTS, &payload)
                    .await?;
            }
            PhoneEventName::Failed => {
                let payload = MessageSendFailed {
                    message_id: message.id,
                    owner: message.owner.clone(),
                    contact: message.contact.clone(),
                    content: message.content.clone(),
                    error_message: command.reason.clone().unwrap_or_default(),
                    timestamp: command.timestamp,
                    order_timestamp: message.order_timestamp,
                };
                self.publish(
                    cancel,
                    EventType::MessageSendFailed,
                    SOURCE_PHONE_EVENTS,
                    &payload,
                )
                .await?;
            }
        }

        self.load(command.message_id).await
    }

    /// Pages through a conversation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the repository fails.
    pub async fn index(&self, query: &MessageIndex) -> Result<Vec<Message>, DomainError> {
        self.repository
            .index(&query.owner, &query.contact, query.skip, query.limit)
            .await
    }

    /// Marks a message as picked up by the phone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message is missing or cannot be updated.
    pub async fn apply_phone_sending(&self, payload: &MessagePhoneStatus) -> Result<(), DomainError> {
        self.transition(payload.message_id, "sending", |message, now| {
            message.mark_sending(payload.timestamp, now)
        })
        .await
    }

    /// Marks a message as sent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message is missing or cannot be updated.
    pub async fn apply_phone_sent(&self, payload: &MessagePhoneStatus) -> Result<(), DomainError> {
        self.transition(payload.message_id, "sent", |message, now| {
            message.mark_sent(payload.timestamp, now)
        })
        .await
    }

    /// Marks a message as delivered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message is missing or cannot be updated.
    pub async fn apply_phone_delivered(
        &self,
        payload: &MessagePhoneStatus,
    ) -> Result<(), DomainError> {
        self.transition(payload.message_id, "delivered", |message, now| {
            message.mark_delivered(payload.timestamp, now)
        })
        .await
    }

    /// Marks a message as failed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the message is missing or cannot be updated.
    pub async fn apply_send_failed(&self, payload: &MessageSendFailed) -> Result<(), DomainError> {
        self.transition(payload.message_id, "failed", |message, now| {
            message.mark_failed(payload.timestamp, &payload.error_message, now)
        })
        .await
    }

    async fn load(&self, message_id: Uuid) -> Result<Message, DomainError> {
        self.repository
            .load(message_id)
            .await?
            .ok_or_else(|| DomainError::not_found("message", message_id))
    }

    async fn transition(
        &self,
        message_id: Uuid,
        target: &str,
        apply: impl FnOnce(&mut Message, DateTime<Utc>) -> bool + Send,
    ) -> Result<(), DomainError> {
        let mut message = self.load(message_id).await?;
        let from = message.status;
        if !apply(&mut message, self.clock.now()) {
            warn!(%message_id, %from, target, "ignoring status report");
            return Ok(());
        }
        self.repository.update(&message).await?;
        debug!(%message_id, %from, to = %message.status, "message status changed");
        Ok(())
    }

    async fn publish<P: serde::Serialize + Sync>(
        &self,
        cancel: &CancellationToken,
        event_type: EventType,
        source: &str,
        payload: &P,
    ) -> Result<(), DomainError> {
        let event = Event::new(event_type, source, payload, self.clock.as_ref())?;
        match self.dispatcher.publish(cancel, &event).await {
            Ok(()) => Ok(()),
            Err(err) => err.tolerate_listener_failures(),
        }
    }
}
