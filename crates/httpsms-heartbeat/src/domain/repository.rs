//! Heartbeat persistence port.

use async_trait::async_trait;
use httpsms_core::error::DomainError;

use super::heartbeat::{Heartbeat, HeartbeatMonitor};

/// Repository for heartbeats and their per-owner monitor.
#[async_trait]
pub trait HeartbeatRepository: Send + Sync {
    /// Inserts a heartbeat.
    async fn store(&self, heartbeat: &Heartbeat) -> Result<(), DomainError>;

    /// Heartbeats of `owner`, newest first.
    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Heartbeat>, DomainError>;

    /// Loads the monitor of `owner`.
    async fn load_monitor(&self, owner: &str) -> Result<Option<HeartbeatMonitor>, DomainError>;

    /// Upserts a monitor. An existing monitor with a later
    /// `last_heartbeat_at` is kept.
    async fn save_monitor(&self, monitor: &HeartbeatMonitor) -> Result<(), DomainError>;
}
