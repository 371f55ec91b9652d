//! Event model shared by the dispatcher, services and listeners.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::DomainError;

/// Topics an event can be published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventType {
    /// A message was accepted from the API and queued for a phone.
    MessageApiSent,
    /// A phone fetched a pending message and is about to send it.
    MessagePhoneSending,
    /// A phone reported the message as sent.
    MessagePhoneSent,
    /// A phone reported the message as delivered.
    MessagePhoneDelivered,
    /// A phone reported that sending failed.
    MessageSendFailed,
    /// A phone received an inbound SMS.
    MessagePhoneReceived,
    /// A phone sent a heartbeat.
    HeartbeatReceived,
    /// A message thread was created or moved forward.
    ThreadUpdated,
}

impl EventType {
    /// Every topic, in declaration order.
    pub const ALL: [EventType; 8] = [
        EventType::MessageApiSent,
        EventType::MessagePhoneSending,
        EventType::MessagePhoneSent,
        EventType::MessagePhoneDelivered,
        EventType::MessageSendFailed,
        EventType::MessagePhoneReceived,
        EventType::HeartbeatReceived,
        EventType::ThreadUpdated,
    ];

    /// The wire name of the topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::MessageApiSent => "message.api.sent",
            EventType::MessagePhoneSending => "message.phone.sending",
            EventType::MessagePhoneSent => "message.phone.sent",
            EventType::MessagePhoneDelivered => "message.phone.delivered",
            EventType::MessageSendFailed => "message.send.failed",
            EventType::MessagePhoneReceived => "message.phone.received",
            EventType::HeartbeatReceived => "heartbeat.received",
            EventType::ThreadUpdated => "thread.updated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown event type: {s}")))
    }
}

impl TryFrom<String> for EventType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.as_str().to_owned()
    }
}

/// An immutable record of something that happened.
///
/// The `id` doubles as the idempotency key for listeners, so re-publishing a
/// cloned event never repeats side effects that already succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    event_type: EventType,
    source: String,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl Event {
    /// Creates a new event with a fresh id, stamped by `clock`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the payload cannot be
    /// serialized to JSON.
    pub fn new<P: Serialize>(
        event_type: EventType,
        source: impl Into<String>,
        payload: &P,
        clock: &dyn Clock,
    ) -> Result<Self, DomainError> {
        let payload = serde_json::to_value(payload).map_err(|e| {
            DomainError::Infrastructure(format!("cannot serialize {event_type} payload: {e}"))
        })?;
        Ok(Self::from_parts(
            Uuid::new_v4(),
            event_type,
            source.into(),
            payload,
            clock.now(),
        ))
    }

    /// Rebuilds an event from stored parts.
    #[must_use]
    pub fn from_parts(
        id: Uuid,
        event_type: EventType,
        source: String,
        payload: serde_json::Value,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_type,
            source,
            payload,
            occurred_at,
        }
    }

    /// Unique event identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Topic the event is published under.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// The operation that produced the event.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Raw JSON payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the event was created.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Deserializes the payload into the listener's expected shape.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the payload does not match `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            DomainError::Validation(format!(
                "event {} ({}) has an invalid payload: {e}",
                self.id, self.event_type
            ))
        })
    }
}
