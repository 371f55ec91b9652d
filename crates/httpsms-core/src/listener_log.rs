//! Listener execution log.
//!
//! One record per (event, listener) pair. The record is how a listener knows
//! it already handled an event when the same event is delivered again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Outcome of a listener's attempt at an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerStatus {
    /// The listener started but has not finished.
    Pending,
    /// The side effect completed.
    Success,
    /// The side effect returned an error or panicked.
    Failed,
}

impl ListenerStatus {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ListenerStatus::Pending => "pending",
            ListenerStatus::Success => "success",
            ListenerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ListenerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListenerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ListenerStatus::Pending),
            "success" => Ok(ListenerStatus::Success),
            "failed" => Ok(ListenerStatus::Failed),
            other => Err(DomainError::Infrastructure(format!(
                "unknown listener status: {other}"
            ))),
        }
    }
}

/// Durable record of whether a listener has processed an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListenerLog {
    /// Row identifier.
    pub id: Uuid,
    /// The event that was delivered.
    pub event_id: Uuid,
    /// The listener the event was delivered to.
    pub listener_name: String,
    /// Current outcome.
    pub status: ListenerStatus,
    /// Error text of the last failed attempt.
    pub error: Option<String>,
    /// First attempt.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl EventListenerLog {
    /// A fresh pending record for a first delivery.
    #[must_use]
    pub fn pending(event_id: Uuid, listener_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            listener_name: listener_name.into(),
            status: ListenerStatus::Pending,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the side effect already completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ListenerStatus::Success
    }

    /// Moves a failed or stale record back to pending for another attempt.
    pub fn retry(&mut self, now: DateTime<Utc>) {
        self.status = ListenerStatus::Pending;
        self.error = None;
        self.updated_at = now;
    }

    /// Records a completed side effect.
    pub fn succeed(&mut self, now: DateTime<Utc>) {
        self.status = ListenerStatus::Success;
        self.error = None;
        self.updated_at = now;
    }

    /// Records a failed side effect.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) {
        self.status = ListenerStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
    }
}
