//! `PostgreSQL` implementation of the `MessageRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use httpsms_core::error::DomainError;
use httpsms_message::domain::message::{Message, MessageStatus, MessageType};
use httpsms_message::domain::repository::MessageRepository;

use crate::convert::{db_error, page, parse_column};

const COLUMNS: &str = "id, owner, contact, content, kind, status, request_received_at, \
    order_timestamp, last_attempted_at, sent_at, delivered_at, failed_at, received_at, \
    failure_reason, created_at, updated_at";

/// PostgreSQL-backed message repository.
#[derive(Debug, Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new `PgMessageRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
        let kind: String = row.try_get("kind").map_err(db_error)?;
        let status: String = row.try_get("status").map_err(db_error)?;
        Ok(Message {
            id: row.try_get("id").map_err(db_error)?,
            owner: row.try_get("owner").map_err(db_error)?,
            contact: row.try_get("contact").map_err(db_error)?,
            content: row.try_get("content").map_err(db_error)?,
            kind: parse_column::<MessageType>(&kind)?,
            status: parse_column::<MessageStatus>(&status)?,
            request_received_at: row.try_get("request_received_at").map_err(db_error)?,
            order_timestamp: row.try_get("order_timestamp").map_err(db_error)?,
            last_attempted_at: row.try_get("last_attempted_at").map_err(db_error)?,
            sent_at: row.try_get("sent_at").map_err(db_error)?,
            delivered_at: row.try_get("delivered_at").map_err(db_error)?,
            failed_at: row.try_get("failed_at").map_err(db_error)?,
            received_at: row.try_get("received_at").map_err(db_error)?,
            failure_reason: row.try_get("failure_reason").map_err(db_error)?,
            created_at: row.try_get("created_at").map_err(db_error)?,
            updated_at: row.try_get("updated_at").map_err(db_error)?,
        })
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn store(&self, message: &Message) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO messages ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(message.id)
        .bind(&message.owner)
        .bind(&message.contact)
        .bind(&message.content)
        .bind(message.kind.as_str())
        .bind(message.status.as_str())
        .bind(message.request_received_at)
        .bind(message.order_timestamp)
        .bind(message.last_attempted_at)
        .bind(message.sent_at)
        .bind(message.delivered_at)
        .bind(message.failed_at)
        .bind(message.received_at)
        .bind(message.failure_reason.as_deref())
        .bind(message.created_at)
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, message: &Message) -> Result<(), DomainError> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET status = $2, last_attempted_at = $3, sent_at = $4, delivered_at = $5,
                failed_at = $6, failure_reason = $7, updated_at = $8
            WHERE id = $1
            ",
        )
        .bind(message.id)
        .bind(message.status.as_str())
        .bind(message.last_attempted_at)
        .bind(message.sent_at)
        .bind(message.delivered_at)
        .bind(message.failed_at)
        .bind(message.failure_reason.as_deref())
        .bind(message.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("message", message.id));
        }
        Ok(())
    }

    async fn load(&self, message_id: Uuid) -> Result<Option<Message>, DomainError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM messages WHERE id = $1"))
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(Self::row_to_message).transpose()
    }

    async fn index(
        &self,
        owner: &str,
        contact: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError> {
        let (offset, limit) = page(skip, limit);
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE owner = $1 AND contact = $2 \
             ORDER BY order_timestamp DESC \
             OFFSET $3 LIMIT $4"
        ))
        .bind(owner)
        .bind(contact)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn outstanding(&self, owner: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE owner = $1 AND status = 'pending' \
             ORDER BY request_received_at ASC \
             LIMIT $2"
        ))
        .bind(owner)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::row_to_message).collect()
    }
}
