//! Inputs to the message service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Queue an outgoing message for the owner's phone.
#[derive(Debug, Clone)]
pub struct SendMessage {
    /// The phone that will send it.
    pub owner: String,
    /// The recipient.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// When the API accepted the request.
    pub request_received_at: DateTime<Utc>,
}

/// Store an inbound message reported by the phone.
#[derive(Debug, Clone)]
pub struct ReceiveMessage {
    /// The receiving phone.
    pub owner: String,
    /// The sender.
    pub contact: String,
    /// Text body.
    pub content: String,
    /// When the phone received it.
    pub timestamp: DateTime<Utc>,
}

/// Hand pending messages to the owner's phone.
#[derive(Debug, Clone)]
pub struct GetOutstanding {
    /// The fetching phone.
    pub owner: String,
    /// Maximum number of messages to hand out.
    pub limit: u32,
}

/// Status reports a phone can make about an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhoneEventName {
    /// The phone sent the message.
    Sent,
    /// The carrier delivered it.
    Delivered,
    /// Sending failed.
    Failed,
}

/// A phone's status report about an outgoing message.
#[derive(Debug, Clone)]
pub struct StorePhoneEvent {
    /// The message reported on.
    pub message_id: Uuid,
    /// What happened.
    pub event_name: PhoneEventName,
    /// When it happened on the phone.
    pub timestamp: DateTime<Utc>,
    /// Failure reason for `Failed`.
    pub reason: Option<String>,
}

/// Page through the conversation between an owner and a contact.
#[derive(Debug, Clone)]
pub struct MessageIndex {
    /// The owner's phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// Rows to skip.
    pub skip: u32,
    /// Page size.
    pub limit: u32,
}
