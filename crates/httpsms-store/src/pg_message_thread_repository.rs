//! `PostgreSQL` implementation of the `MessageThreadRepository` trait.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use httpsms_core::error::DomainError;
use httpsms_message::domain::message::MessageStatus;
use httpsms_message_thread::domain::repository::MessageThreadRepository;
use httpsms_message_thread::domain::thread::MessageThread;

use crate::convert::{db_error, page, parse_column};

/// PostgreSQL-backed message thread repository. `(owner, contact)` is unique.
#[derive(Debug, Clone)]
pub struct PgMessageThreadRepository {
    pool: PgPool,
}

impl PgMessageThreadRepository {
    /// Creates a new `PgMessageThreadRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_thread(row: &PgRow) -> Result<MessageThread, DomainError> {
        let status: String = row.try_get("status").map_err(db_error)?;
        Ok(MessageThread {
            id: row.try_get("id").map_err(db_error)?,
            owner: row.try_get("owner").map_err(db_error)?,
            contact: row.try_get("contact").map_err(db_error)?,
            last_message_id: row.try_get("last_message_id").map_err(db_error)?,
            last_message_content: row.try_get("last_message_content").map_err(db_error)?,
            status: parse_column::<MessageStatus>(&status)?,
            order_timestamp: row.try_get("order_timestamp").map_err(db_error)?,
            created_at: row.try_get("created_at").map_err(db_error)?,
            updated_at: row.try_get("updated_at").map_err(db_error)?,
        })
    }
}

#[async_trait]
impl MessageThreadRepository for PgMessageThreadRepository {
    async fn store(&self, thread: &MessageThread) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO message_threads
                (id, owner, contact, last_message_id, last_message_content, status,
                 order_timestamp, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(thread.id)
        .bind(&thread.owner)
        .bind(&thread.contact)
        .bind(thread.last_message_id)
        .bind(&thread.last_message_content)
        .bind(thread.status.as_str())
        .bind(thread.order_timestamp)
        .bind(thread.created_at)
        .bind(thread.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, thread: &MessageThread) -> Result<(), DomainError> {
        let result = sqlx::query(
            r"
            UPDATE message_threads
            SET last_message_id = $2, last_message_content = $3, status = $4,
                order_timestamp = $5, updated_at = $6
            WHERE id = $1
            ",
        )
        .bind(thread.id)
        .bind(thread.last_message_id)
        .bind(&thread.last_message_content)
        .bind(thread.status.as_str())
        .bind(thread.order_timestamp)
        .bind(thread.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("message thread", thread.id));
        }
        Ok(())
    }

    async fn load_by_owner_contact(
        &self,
        owner: &str,
        contact: &str,
    ) -> Result<Option<MessageThread>, DomainError> {
        let row = sqlx::query(
            r"
            SELECT id, owner, contact, last_message_id, last_message_content, status,
                   order_timestamp, created_at, updated_at
            FROM message_threads
            WHERE owner = $1 AND contact = $2
            ",
        )
        .bind(owner)
        .bind(contact)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.as_ref().map(Self::row_to_thread).transpose()
    }

    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<MessageThread>, DomainError> {
        let (offset, limit) = page(skip, limit);
        let rows = sqlx::query(
            r"
            SELECT id, owner, contact, last_message_id, last_message_content, status,
                   order_timestamp, created_at, updated_at
            FROM message_threads
            WHERE owner = $1
            ORDER BY order_timestamp DESC
            OFFSET $2 LIMIT $3
            ",
        )
        .bind(owner)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.iter().map(Self::row_to_thread).collect()
    }
}
