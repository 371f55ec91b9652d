//! `PostgreSQL` implementation of the `EventListenerLogRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use httpsms_core::error::DomainError;
use httpsms_core::listener_log::{EventListenerLog, ListenerStatus};
use httpsms_core::repository::EventListenerLogRepository;

use crate::convert::{db_error, parse_column};

/// PostgreSQL-backed listener log.
///
/// `(event_id, listener_name)` is unique. Saving upserts on that pair and
/// leaves a success row untouched.
#[derive(Debug, Clone)]
pub struct PgEventListenerLogRepository {
    pool: PgPool,
}

impl PgEventListenerLogRepository {
    /// Creates a new `PgEventListenerLogRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_log(row: &PgRow) -> Result<EventListenerLog, DomainError> {
        let status: String = row.try_get("status").map_err(db_error)?;
        Ok(EventListenerLog {
            id: row.try_get("id").map_err(db_error)?,
            event_id: row.try_get("event_id").map_err(db_error)?,
            listener_name: row.try_get("listener_name").map_err(db_error)?,
            status: parse_column::<ListenerStatus>(&status)?,
            error: row.try_get("error").map_err(db_error)?,
            created_at: row.try_get("created_at").map_err(db_error)?,
            updated_at: row.try_get("updated_at").map_err(db_error)?,
        })
    }
}

#[async_trait]
impl EventListenerLogRepository for PgEventListenerLogRepository {
    async fn save(&self, log: &EventListenerLog) -> Result<(), DomainError> {
        let result = sqlx::query(
            r"
            INSERT INTO event_listener_logs
                (id, event_id, listener_name, status, error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (event_id, listener_name) DO UPDATE SET
                status = EXCLUDED.status,
                error = EXCLUDED.error,
                updated_at = EXCLUDED.updated_at
            WHERE event_listener_logs.status <> 'success'
            ",
        )
        .bind(log.id)
        .bind(log.event_id)
        .bind(&log.listener_name)
        .bind(log.status.as_str())
        .bind(log.error.as_deref())
        .bind(log.created_at)
        .bind(log.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            debug!(
                event_id = %log.event_id,
                listener = %log.listener_name,
                "listener log already successful, save ignored"
            );
        }
        Ok(())
    }

    async fn find_by_event_and_listener(
        &self,
        event_id: Uuid,
        listener_name: &str,
    ) -> Result<Option<EventListenerLog>, DomainError> {
        let row = sqlx::query(
            r"
            SELECT id, event_id, listener_name, status, error, created_at, updated_at
            FROM event_listener_logs
            WHERE event_id = $1 AND listener_name = $2
            ",
        )
        .bind(event_id)
        .bind(listener_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(Self::row_to_log).transpose()
    }
}
