//! Heartbeat service.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_events::EventDispatcher;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::commands::StoreHeartbeat;
use crate::domain::events::HeartbeatReceived;
use crate::domain::heartbeat::{Heartbeat, HeartbeatMonitor};
use crate::domain::repository::HeartbeatRepository;

const SOURCE_HEARTBEATS: &str = "/v1/heartbeats";

/// Operations on heartbeats.
pub struct HeartbeatService {
    repository: Arc<dyn HeartbeatRepository>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl HeartbeatService {
    /// Creates a new `HeartbeatService`.
    #[must_use]
    pub fn new(
        repository: Arc<dyn HeartbeatRepository>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// Stores a heartbeat and publishes `heartbeat.received`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the heartbeat or the event cannot be stored.
    #[instrument(skip_all, fields(owner = %command.owner))]
    pub async fn store(
        &self,
        cancel: &CancellationToken,
        command: &StoreHeartbeat,
    ) -> Result<Heartbeat, DomainError> {
        let heartbeat = Heartbeat::new(command.owner.clone(), command.timestamp);
        self.repository.store(&heartbeat).await?;

        let payload = HeartbeatReceived {
            heartbeat_id: heartbeat.id,
            owner: heartbeat.owner.clone(),
            timestamp: heartbeat.timestamp,
        };
        let event = Event::new(
            EventType::HeartbeatReceived,
            SOURCE_HEARTBEATS,
            &payload,
            self.clock.as_ref(),
        )?;
        if let Err(err) = self.dispatcher.publish(cancel, &event).await {
            err.tolerate_listener_failures()?;
        }

        debug!(heartbeat_id = %heartbeat.id, "heartbeat stored");
        Ok(heartbeat)
    }

    /// Heartbeats of `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the repository fails.
    pub async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Heartbeat>, DomainError> {
        self.repository.index(owner, skip, limit).await
    }

    /// The owner's monitor.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the owner never sent a heartbeat.
    pub async fn monitor(&self, owner: &str) -> Result<HeartbeatMonitor, DomainError> {
        self.repository
            .load_monitor(owner)
            .await?
            .ok_or_else(|| DomainError::not_found("heartbeat monitor", owner))
    }

    /// Advances the owner's monitor to the received heartbeat.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the monitor cannot be loaded or saved.
    pub async fn apply_heartbeat_received(
        &self,
        payload: &HeartbeatReceived,
    ) -> Result<(), DomainError> {
        let now = self.clock.now();
        let monitor = match self.repository.load_monitor(&payload.owner).await? {
            None => HeartbeatMonitor::first(payload.owner.clone(), payload.timestamp, now),
            Some(mut monitor) => {
                if !monitor.advance(payload.timestamp, now) {
                    return Ok(());
                }
                monitor
            }
        };
        self.repository.save_monitor(&monitor).await
    }
}
