//! The message thread entity.

use chrono::{DateTime, Utc};
use httpsms_message::domain::message::MessageStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Summary of the conversation between an owner's phone and a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageThread {
    /// Thread identifier.
    pub id: Uuid,
    /// The owner's phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// Latest message in the conversation.
    pub last_message_id: Uuid,
    /// Body of the latest message.
    pub last_message_content: String,
    /// Status of the latest message.
    pub status: MessageStatus,
    /// Timestamp of the latest message; threads sort on it.
    pub order_timestamp: DateTime<Utc>,
    /// Row creation.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// A message activity to fold into a thread.
#[derive(Debug, Clone)]
pub struct ThreadActivity {
    /// The owner's phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// The message.
    pub message_id: Uuid,
    /// Its body.
    pub content: String,
    /// Its status after the activity.
    pub status: MessageStatus,
    /// The message's order timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MessageThread {
    /// Starts a thread from its first activity.
    #[must_use]
    pub fn start(activity: &ThreadActivity, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: activity.owner.clone(),
            contact: activity.contact.clone(),
            last_message_id: activity.message_id,
            last_message_content: activity.content.clone(),
            status: activity.status,
            order_timestamp: activity.timestamp,
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds an activity into the thread; returns whether the thread changed.
    ///
    /// A status change of the thread's latest message updates the status in
    /// place. Activities of messages older than the latest one are ignored.
    pub fn apply(&mut self, activity: &ThreadActivity, now: DateTime<Utc>) -> bool {
        if activity.message_id == self.last_message_id {
            if activity.status == self.status {
                return false;
            }
            self.status = activity.status;
            self.updated_at = now;
            return true;
        }
        if activity.timestamp < self.order_timestamp {
            return false;
        }
        self.last_message_id = activity.message_id;
        self.last_message_content.clone_from(&activity.content);
        self.status = activity.status;
        self.order_timestamp = activity.timestamp;
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn activity(status: MessageStatus, timestamp: DateTime<Utc>) -> ThreadActivity {
        ThreadActivity {
            owner: "+18005550199".to_owned(),
            contact: "+18005550100".to_owned(),
            message_id: Uuid::new_v4(),
            content: format!("{status} message"),
            status,
            timestamp,
        }
    }

    #[test]
    fn test_newer_activity_moves_thread_forward() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut thread = MessageThread::start(&activity(MessageStatus::Pending, now), now);
        let newer = activity(MessageStatus::Received, now + Duration::minutes(1));

        // Act
        let changed = thread.apply(&newer, now + Duration::minutes(1));

        // Assert
        assert!(changed);
        assert_eq!(thread.last_message_id, newer.message_id);
        assert_eq!(thread.status, MessageStatus::Received);
        assert_eq!(thread.order_timestamp, newer.timestamp);
    }

    #[test]
    fn test_older_activity_is_ignored() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let mut thread = MessageThread::start(&activity(MessageStatus::Received, now), now);
        let before = thread.clone();

        // Act
        let changed = thread.apply(
            &activity(MessageStatus::Sent, now - Duration::minutes(5)),
            now,
        );

        // Assert
        assert!(!changed);
        assert_eq!(thread, before);
    }

    #[test]
    fn test_same_timestamp_status_update_is_applied() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let first = activity(MessageStatus::Pending, now);
        let mut thread = MessageThread::start(&first, now);

        let changed = thread.apply(
            &ThreadActivity {
                status: MessageStatus::Sent,
                ..first
            },
            now,
        );

        assert!(changed);
        assert_eq!(thread.status, MessageStatus::Sent);
    }

    #[test]
    fn test_status_change_of_latest_message_keeps_order_timestamp() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let first = activity(MessageStatus::Sent, now);
        let mut thread = MessageThread::start(&first, now);

        // Act
        let changed = thread.apply(
            &ThreadActivity {
                status: MessageStatus::Delivered,
                timestamp: now + Duration::minutes(2),
                ..first.clone()
            },
            now + Duration::minutes(2),
        );
        let repeated = thread.apply(
            &ThreadActivity {
                status: MessageStatus::Delivered,
                ..first
            },
            now + Duration::minutes(3),
        );

        // Assert
        assert!(changed);
        assert!(!repeated);
        assert_eq!(thread.status, MessageStatus::Delivered);
        assert_eq!(thread.order_timestamp, now);
        assert_eq!(thread.updated_at, now + Duration::minutes(2));
    }
}
