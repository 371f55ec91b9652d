//! Repository abstractions for events and listener logs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::Event;
use crate::listener_log::EventListenerLog;

/// Repository for published events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Stores an event. Storing an id that already exists is a no-op so the
    /// same event can be delivered again.
    async fn save(&self, event: &Event) -> Result<(), DomainError>;

    /// Loads an event by id.
    async fn load(&self, event_id: Uuid) -> Result<Option<Event>, DomainError>;
}

/// Repository for listener execution records.
///
/// Implementations must keep at most one row per `(event_id, listener_name)`
/// and must never replace a success row with another status.
#[async_trait]
pub trait EventListenerLogRepository: Send + Sync {
    /// Inserts or updates the record for `(log.event_id, log.listener_name)`.
    async fn save(&self, log: &EventListenerLog) -> Result<(), DomainError>;

    /// Finds the record for a pair. `Ok(None)` means the listener has never
    /// seen the event.
    async fn find_by_event_and_listener(
        &self,
        event_id: Uuid,
        listener_name: &str,
    ) -> Result<Option<EventListenerLog>, DomainError>;
}
