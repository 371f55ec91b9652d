//! Test listeners that record deliveries into a shared journal.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use httpsms_core::event::Event;
use httpsms_events::EventListener;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// What a [`RecordingListener`] does after recording a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerBehavior {
    /// Return `Ok(())`.
    Succeed,
    /// Return an infrastructure error.
    Fail,
    /// Panic.
    Panic,
    /// Fail on the first delivery, succeed afterwards.
    FailOnce,
}

/// Journal shared between listeners so tests can assert delivery order.
pub type Journal = Arc<Mutex<Vec<(String, Uuid)>>>;

/// A listener that appends `(name, event_id)` to a journal on every call.
#[derive(Debug)]
pub struct RecordingListener {
    name: String,
    behavior: ListenerBehavior,
    journal: Journal,
    calls: Mutex<usize>,
}

impl RecordingListener {
    /// Creates a listener writing to `journal`.
    #[must_use]
    pub fn new(name: &str, behavior: ListenerBehavior, journal: Journal) -> Self {
        Self {
            name: name.to_owned(),
            behavior,
            journal,
            calls: Mutex::new(0),
        }
    }

    /// Creates a succeeding listener with its own journal.
    #[must_use]
    pub fn succeeding(name: &str) -> Self {
        Self::new(name, ListenerBehavior::Succeed, Journal::default())
    }

    /// Number of deliveries received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl EventListener for RecordingListener {
    async fn handle(&self, _cancel: &CancellationToken, event: &Event) -> Result<(), DomainError> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        self.journal
            .lock()
            .unwrap()
            .push((self.name.clone(), event.id()));

        match self.behavior {
            ListenerBehavior::Succeed => Ok(()),
            ListenerBehavior::FailOnce if attempt > 1 => Ok(()),
            ListenerBehavior::Fail | ListenerBehavior::FailOnce => Err(
                DomainError::Infrastructure(format!("{} failed", self.name)),
            ),
            ListenerBehavior::Panic => panic!("{} panicked", self.name),
        }
    }
}
