//! `PostgreSQL` implementation of the `HeartbeatRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use httpsms_core::error::DomainError;
use httpsms_heartbeat::domain::heartbeat::{Heartbeat, HeartbeatMonitor};
use httpsms_heartbeat::domain::repository::HeartbeatRepository;

use crate::convert::{db_error, page};

/// PostgreSQL-backed heartbeat repository.
#[derive(Debug, Clone)]
pub struct PgHeartbeatRepository {
    pool: PgPool,
}

impl PgHeartbeatRepository {
    /// Creates a new `PgHeartbeatRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_heartbeat(row: &PgRow) -> Result<Heartbeat, DomainError> {
        Ok(Heartbeat {
            id: row.try_get("id").map_err(db_error)?,
            owner: row.try_get("owner").map_err(db_error)?,
            timestamp: row.try_get("timestamp").map_err(db_error)?,
        })
    }

    fn row_to_monitor(row: &PgRow) -> Result<HeartbeatMonitor, DomainError> {
        Ok(HeartbeatMonitor {
            owner: row.try_get("owner").map_err(db_error)?,
            last_heartbeat_at: row.try_get("last_heartbeat_at").map_err(db_error)?,
            updated_at: row.try_get("updated_at").map_err(db_error)?,
        })
    }
}

#[async_trait]
impl HeartbeatRepository for PgHeartbeatRepository {
    async fn store(&self, heartbeat: &Heartbeat) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO heartbeats (id, owner, timestamp) VALUES ($1, $2, $3)")
            .bind(heartbeat.id)
            .bind(&heartbeat.owner)
            .bind(heartbeat.timestamp)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Heartbeat>, DomainError> {
        let (offset, limit) = page(skip, limit);
        let rows = sqlx::query(
            r"
            SELECT id, owner, timestamp FROM heartbeats
            WHERE owner = $1
            ORDER BY timestamp DESC
            OFFSET $2 LIMIT $3
            ",
        )
        .bind(owner)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::row_to_heartbeat).collect()
    }

    async fn load_monitor(&self, owner: &str) -> Result<Option<HeartbeatMonitor>, DomainError> {
        let row = sqlx::query(
            "SELECT owner, last_heartbeat_at, updated_at FROM heartbeat_monitors WHERE owner = $1",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(Self::row_to_monitor).transpose()
    }

    async fn save_monitor(&self, monitor: &HeartbeatMonitor) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO heartbeat_monitors (owner, last_heartbeat_at, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (owner) DO UPDATE SET
                last_heartbeat_at = EXCLUDED.last_heartbeat_at,
                updated_at = EXCLUDED.updated_at
            WHERE heartbeat_monitors.last_heartbeat_at < EXCLUDED.last_heartbeat_at
            ",
        )
        .bind(&monitor.owner)
        .bind(monitor.last_heartbeat_at)
        .bind(monitor.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}
