//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventRepository;

use crate::convert::{db_error, parse_column};

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: &PgRow) -> Result<Event, DomainError> {
        let event_type: String = row.try_get("event_type").map_err(db_error)?;
        Ok(Event::from_parts(
            row.try_get("id").map_err(db_error)?,
            parse_column::<EventType>(&event_type)?,
            row.try_get("source").map_err(db_error)?,
            row.try_get("payload").map_err(db_error)?,
            row.try_get("occurred_at").map_err(db_error)?,
        ))
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO events (id, event_type, source, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(event.id())
        .bind(event.event_type().as_str())
        .bind(event.source())
        .bind(event.payload())
        .bind(event.occurred_at())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn load(&self, event_id: Uuid) -> Result<Option<Event>, DomainError> {
        let row = sqlx::query(
            "SELECT id, event_type, source, payload, occurred_at FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(Self::row_to_event).transpose()
    }
}
