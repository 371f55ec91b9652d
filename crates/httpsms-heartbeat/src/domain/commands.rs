//! Inputs to the heartbeat service.

use chrono::{DateTime, Utc};

/// Record that the owner's phone is alive.
#[derive(Debug, Clone)]
pub struct StoreHeartbeat {
    /// The reporting phone.
    pub owner: String,
    /// When the phone reported.
    pub timestamp: DateTime<Utc>,
}
