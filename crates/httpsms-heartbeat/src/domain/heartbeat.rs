//! Heartbeat entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A liveness report from a phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Heartbeat {
    /// Heartbeat identifier.
    pub id: Uuid,
    /// The reporting phone.
    pub owner: String,
    /// When the phone reported.
    pub timestamp: DateTime<Utc>,
}

impl Heartbeat {
    /// A new heartbeat with a fresh id.
    #[must_use]
    pub fn new(owner: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            timestamp,
        }
    }
}

/// Last time an owner's phone was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HeartbeatMonitor {
    /// The monitored phone.
    pub owner: String,
    /// Latest heartbeat seen from the phone.
    pub last_heartbeat_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl HeartbeatMonitor {
    /// A monitor seeded with its first heartbeat.
    #[must_use]
    pub fn first(owner: String, at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            last_heartbeat_at: at,
            updated_at: now,
        }
    }

    /// Moves the monitor forward. Older heartbeats leave it untouched;
    /// returns whether it changed.
    pub fn advance(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if at <= self.last_heartbeat_at {
            return false;
        }
        self.last_heartbeat_at = at;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_monitor_advances_on_newer_heartbeat() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut monitor = HeartbeatMonitor::first("+18005550199".to_owned(), now, now);

        // Act
        let changed = monitor.advance(now + Duration::minutes(2), now + Duration::minutes(2));

        // Assert
        assert!(changed);
        assert_eq!(monitor.last_heartbeat_at, now + Duration::minutes(2));
    }

    #[test]
    fn test_monitor_never_moves_backwards() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut monitor = HeartbeatMonitor::first("+18005550199".to_owned(), now, now);

        assert!(!monitor.advance(now - Duration::minutes(1), now));
        assert!(!monitor.advance(now, now));
        assert_eq!(monitor.last_heartbeat_at, now);
    }
}
