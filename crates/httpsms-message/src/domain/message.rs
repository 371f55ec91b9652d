//! The message entity and its status machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use httpsms_core::error::DomainError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a message relative to the owner's phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    /// Sent from the API to a contact through the phone.
    MobileTerminated,
    /// Received by the phone from a contact.
    MobileOriginated,
}

impl MessageType {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::MobileTerminated => "mobile-terminated",
            MessageType::MobileOriginated => "mobile-originated",
        }
    }
}

impl FromStr for MessageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile-terminated" => Ok(MessageType::MobileTerminated),
            "mobile-originated" => Ok(MessageType::MobileOriginated),
            other => Err(DomainError::Infrastructure(format!(
                "unknown message type: {other}"
            ))),
        }
    }
}

/// Where a message is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Waiting for the phone to pick it up.
    Pending,
    /// Handed to the phone.
    Sending,
    /// The phone sent it.
    Sent,
    /// The carrier confirmed delivery.
    Delivered,
    /// The phone could not send it.
    Failed,
    /// An inbound message.
    Received,
}

impl MessageStatus {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Failed => "failed",
            MessageStatus::Received => "received",
        }
    }

    /// No further phone reports change a message in this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MessageStatus::Delivered | MessageStatus::Failed | MessageStatus::Received
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MessageStatus::Pending),
            "sending" => Ok(MessageStatus::Sending),
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "failed" => Ok(MessageStatus::Failed),
            "received" => Ok(MessageStatus::Received),
            other => Err(DomainError::Infrastructure(format!(
                "unknown message status: {other}"
            ))),
        }
    }
}

/// An SMS between the owner's phone and a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// Message identifier.
    pub id: Uuid,
    /// Phone number of the owner's phone.
    pub owner: String,
    /// Phone number of the other party.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// Direction.
    #[serde(rename = "type")]
    pub kind: MessageType,
    /// Lifecycle status.
    pub status: MessageStatus,
    /// When the API accepted (outgoing) or the phone received (incoming) it.
    pub request_received_at: DateTime<Utc>,
    /// Sort key for conversations and threads.
    pub order_timestamp: DateTime<Utc>,
    /// Last time a phone picked the message up.
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// When the phone reported it sent.
    pub sent_at: Option<DateTime<Utc>>,
    /// When the phone reported it delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the phone reported a failure.
    pub failed_at: Option<DateTime<Utc>>,
    /// When the phone received it (incoming only).
    pub received_at: Option<DateTime<Utc>>,
    /// Failure reason reported by the phone.
    pub failure_reason: Option<String>,
    /// Row creation.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// A new outgoing message waiting for the phone.
    #[must_use]
    pub fn outgoing(
        owner: String,
        contact: String,
        content: String,
        request_received_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            contact,
            content,
            kind: MessageType::MobileTerminated,
            status: MessageStatus::Pending,
            request_received_at,
            order_timestamp: request_received_at,
            last_attempted_at: None,
            sent_at: None,
            delivered_at: None,
            failed_at: None,
            received_at: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// An inbound message reported by the phone.
    #[must_use]
    pub fn incoming(
        owner: String,
        contact: String,
        content: String,
        received_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            contact,
            content,
            kind: MessageType::MobileOriginated,
            status: MessageStatus::Received,
            request_received_at: received_at,
            order_timestamp: received_at,
            last_attempted_at: None,
            sent_at: None,
            delivered_at: None,
            failed_at: None,
            received_at: Some(received_at),
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The phone picked the message up. Returns `false` if the status does
    /// not allow it.
    pub fn mark_sending(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if !matches!(self.status, MessageStatus::Pending | MessageStatus::Sending) {
            return false;
        }
        self.status = MessageStatus::Sending;
        self.last_attempted_at = Some(at);
        self.updated_at = now;
        true
    }

    /// The phone sent the message.
    pub fn mark_sent(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if !matches!(self.status, MessageStatus::Pending | MessageStatus::Sending) {
            return false;
        }
        self.status = MessageStatus::Sent;
        self.sent_at = Some(at);
        self.updated_at = now;
        true
    }

    /// The carrier delivered the message.
    pub fn mark_delivered(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = MessageStatus::Delivered;
        self.delivered_at = Some(at);
        self.updated_at = now;
        true
    }

    /// The phone could not send the message.
    pub fn mark_failed(&mut self, at: DateTime<Utc>, reason: &str, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = MessageStatus::Failed;
        self.failed_at = Some(at);
        self.failure_reason = Some(reason.to_owned());
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn outgoing_at(now: DateTime<Utc>) -> Message {
        Message::outgoing(
            "+18005550199".to_owned(),
            "+18005550100".to_owned(),
            "hello".to_owned(),
            now,
            now,
        )
    }

    #[test]
    fn test_outgoing_message_starts_pending() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let message = outgoing_at(now);

        assert_eq!(message.kind, MessageType::MobileTerminated);
        assert_eq!(message.status, MessageStatus::Pending);
        assert_eq!(message.order_timestamp, now);
        assert_eq!(message.sent_at, None);
    }

    #[test]
    fn test_message_moves_through_happy_path() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut message = outgoing_at(now);

        // Act
        let sending = message.mark_sending(now + Duration::seconds(1), now);
        let sent = message.mark_sent(now + Duration::seconds(2), now);
        let delivered = message.mark_delivered(now + Duration::seconds(3), now);

        // Assert
        assert!(sending && sent && delivered);
        assert_eq!(message.status, MessageStatus::Delivered);
        assert_eq!(message.last_attempted_at, Some(now + Duration::seconds(1)));
        assert_eq!(message.sent_at, Some(now + Duration::seconds(2)));
        assert_eq!(message.delivered_at, Some(now + Duration::seconds(3)));
    }

    #[test]
    fn test_terminal_message_ignores_late_reports() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut message = outgoing_at(now);
        message.mark_failed(now, "no signal", now);

        // Act
        let sent = message.mark_sent(now, now);
        let delivered = message.mark_delivered(now, now);

        // Assert
        assert!(!sent);
        assert!(!delivered);
        assert_eq!(message.status, MessageStatus::Failed);
        assert_eq!(message.failure_reason.as_deref(), Some("no signal"));
    }

    #[test]
    fn test_sent_message_cannot_go_back_to_sending() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut message = outgoing_at(now);
        message.mark_sent(now, now);

        assert!(!message.mark_sending(now, now));
        assert_eq!(message.status, MessageStatus::Sent);
    }

    #[test]
    fn test_incoming_message_is_received_and_terminal() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        let message = Message::incoming(
            "+18005550199".to_owned(),
            "+18005550100".to_owned(),
            "hi back".to_owned(),
            now,
            now,
        );

        assert_eq!(message.kind, MessageType::MobileOriginated);
        assert_eq!(message.status, MessageStatus::Received);
        assert!(message.status.is_terminal());
        assert_eq!(message.received_at, Some(now));
    }
}
