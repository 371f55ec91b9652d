//! Test repositories: in-memory and failing event and listener-log stores.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use httpsms_core::event::Event;
use httpsms_core::listener_log::{EventListenerLog, ListenerStatus};
use httpsms_core::repository::{EventListenerLogRepository, EventRepository};
use uuid::Uuid;

/// An event repository that keeps every saved event in memory.
/// Saving an id twice keeps the first copy.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored events, in save order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        let mut events = self.events.lock().unwrap();
        if !events.iter().any(|e| e.id() == event.id()) {
            events.push(event.clone());
        }
        Ok(())
    }

    async fn load(&self, event_id: Uuid) -> Result<Option<Event>, DomainError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == event_id)
            .cloned())
    }
}

/// An event repository that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn save(&self, _event: &Event) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load(&self, _event_id: Uuid) -> Result<Option<Event>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A listener-log repository keyed by `(event_id, listener_name)`, with the
/// same "never downgrade a success row" rule as the PostgreSQL store.
#[derive(Debug, Default)]
pub struct InMemoryEventListenerLogRepository {
    logs: Mutex<HashMap<(Uuid, String), EventListenerLog>>,
    saves: Mutex<Vec<(Uuid, String, ListenerStatus)>>,
}

impl InMemoryEventListenerLogRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn logs(&self) -> Vec<EventListenerLog> {
        self.logs.lock().unwrap().values().cloned().collect()
    }

    /// Returns the stored record for a pair, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, event_id: Uuid, listener_name: &str) -> Option<EventListenerLog> {
        self.logs
            .lock()
            .unwrap()
            .get(&(event_id, listener_name.to_owned()))
            .cloned()
    }

    /// Returns every `save` call as `(event_id, listener_name, status)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saves(&self) -> Vec<(Uuid, String, ListenerStatus)> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventListenerLogRepository for InMemoryEventListenerLogRepository {
    async fn save(&self, log: &EventListenerLog) -> Result<(), DomainError> {
        self.saves.lock().unwrap().push((
            log.event_id,
            log.listener_name.clone(),
            log.status,
        ));

        let mut logs = self.logs.lock().unwrap();
        let key = (log.event_id, log.listener_name.clone());
        match logs.get_mut(&key) {
            Some(existing) if existing.is_success() => {}
            Some(existing) => {
                existing.status = log.status;
                existing.error.clone_from(&log.error);
                existing.updated_at = log.updated_at;
            }
            None => {
                logs.insert(key, log.clone());
            }
        }
        Ok(())
    }

    async fn find_by_event_and_listener(
        &self,
        event_id: Uuid,
        listener_name: &str,
    ) -> Result<Option<EventListenerLog>, DomainError> {
        Ok(self.get(event_id, listener_name))
    }
}

/// A listener-log repository that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingEventListenerLogRepository;

#[async_trait]
impl EventListenerLogRepository for FailingEventListenerLogRepository {
    async fn save(&self, _log: &EventListenerLog) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_by_event_and_listener(
        &self,
        _event_id: Uuid,
        _listener_name: &str,
    ) -> Result<Option<EventListenerLog>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// A listener-log repository whose lookups succeed but whose saves fail.
///
/// With `failing_status` set, only saves of that status fail; the others are
/// kept in memory like `InMemoryEventListenerLogRepository`.
#[derive(Debug, Default)]
pub struct SaveFailingEventListenerLogRepository {
    failing_status: Option<ListenerStatus>,
    inner: InMemoryEventListenerLogRepository,
}

impl SaveFailingEventListenerLogRepository {
    /// Every save fails.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Only saves of `status` fail.
    #[must_use]
    pub fn on_status(status: ListenerStatus) -> Self {
        Self {
            failing_status: Some(status),
            inner: InMemoryEventListenerLogRepository::new(),
        }
    }

    /// Returns the stored record for a pair, if any.
    pub fn get(&self, event_id: Uuid, listener_name: &str) -> Option<EventListenerLog> {
        self.inner.get(event_id, listener_name)
    }
}

#[async_trait]
impl EventListenerLogRepository for SaveFailingEventListenerLogRepository {
    async fn save(&self, log: &EventListenerLog) -> Result<(), DomainError> {
        match self.failing_status {
            Some(status) if status != log.status => self.inner.save(log).await,
            _ => Err(DomainError::Infrastructure("disk full".into())),
        }
    }

    async fn find_by_event_and_listener(
        &self,
        event_id: Uuid,
        listener_name: &str,
    ) -> Result<Option<EventListenerLog>, DomainError> {
        self.inner
            .find_by_event_and_listener(event_id, listener_name)
            .await
    }
}
