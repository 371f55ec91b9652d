//! Event payloads published by the message service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `message.api.sent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageApiSent {
    /// The queued message.
    pub message_id: Uuid,
    /// The sending phone.
    pub owner: String,
    /// The recipient.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// When the API accepted the request.
    pub request_received_at: DateTime<Utc>,
}

/// Payload shared by the phone status reports: `message.phone.sending`,
/// `message.phone.sent` and `message.phone.delivered`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePhoneStatus {
    /// The message the phone reports on.
    pub message_id: Uuid,
    /// The reporting phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// When the phone observed the status change.
    pub timestamp: DateTime<Utc>,
    /// The message's own sort key, unchanged by status reports.
    pub order_timestamp: DateTime<Utc>,
}

/// Payload of `message.send.failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSendFailed {
    /// The message that failed.
    pub message_id: Uuid,
    /// The reporting phone.
    pub owner: String,
    /// The recipient.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// Reason reported by the phone.
    pub error_message: String,
    /// When the phone gave up.
    pub timestamp: DateTime<Utc>,
    /// The message's own sort key.
    pub order_timestamp: DateTime<Utc>,
}

/// Payload of `message.phone.received`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePhoneReceived {
    /// The stored inbound message.
    pub message_id: Uuid,
    /// The receiving phone.
    pub owner: String,
    /// The sender.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// When the phone received it.
    pub timestamp: DateTime<Utc>,
}
