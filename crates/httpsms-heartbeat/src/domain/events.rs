//! Event payloads published by the heartbeat service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of `heartbeat.received`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatReceived {
    /// The stored heartbeat.
    pub heartbeat_id: Uuid,
    /// The reporting phone.
    pub owner: String,
    /// When the phone reported.
    pub timestamp: DateTime<Utc>,
}
