//! In-memory heartbeat repository.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use httpsms_heartbeat::domain::heartbeat::{Heartbeat, HeartbeatMonitor};
use httpsms_heartbeat::domain::repository::HeartbeatRepository;

/// Keeps heartbeats in insertion order and one monitor per owner.
#[derive(Debug, Default)]
pub struct InMemoryHeartbeatRepository {
    heartbeats: Mutex<Vec<Heartbeat>>,
    monitors: Mutex<HashMap<String, HeartbeatMonitor>>,
}

impl InMemoryHeartbeatRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored heartbeat.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn all(&self) -> Vec<Heartbeat> {
        self.heartbeats.lock().unwrap().clone()
    }
}

#[async_trait]
impl HeartbeatRepository for InMemoryHeartbeatRepository {
    async fn store(&self, heartbeat: &Heartbeat) -> Result<(), DomainError> {
        self.heartbeats.lock().unwrap().push(heartbeat.clone());
        Ok(())
    }

    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Heartbeat>, DomainError> {
        let mut heartbeats: Vec<Heartbeat> =
            self.all().into_iter().filter(|h| h.owner == owner).collect();
        heartbeats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(heartbeats
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn load_monitor(&self, owner: &str) -> Result<Option<HeartbeatMonitor>, DomainError> {
        Ok(self.monitors.lock().unwrap().get(owner).cloned())
    }

    async fn save_monitor(&self, monitor: &HeartbeatMonitor) -> Result<(), DomainError> {
        let mut monitors = self.monitors.lock().unwrap();
        match monitors.get(&monitor.owner) {
            Some(existing) if existing.last_heartbeat_at >= monitor.last_heartbeat_at => {}
            _ => {
                monitors.insert(monitor.owner.clone(), monitor.clone());
            }
        }
        Ok(())
    }
}
