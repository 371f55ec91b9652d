//! Event payloads published by the message thread service.

use chrono::{DateTime, Utc};
use httpsms_message::domain::message::MessageStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `thread.updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadUpdated {
    /// The thread.
    pub thread_id: Uuid,
    /// The owner's phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// The message that moved the thread.
    pub last_message_id: Uuid,
    /// That message's status.
    pub status: MessageStatus,
    /// That message's timestamp.
    pub order_timestamp: DateTime<Utc>,
}
