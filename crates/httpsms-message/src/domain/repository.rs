//! Message persistence port.

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use uuid::Uuid;

use super::message::Message;

/// Repository for messages.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Inserts a new message.
    async fn store(&self, message: &Message) -> Result<(), DomainError>;

    /// Overwrites an existing message.
    async fn update(&self, message: &Message) -> Result<(), DomainError>;

    /// Loads a message by id.
    async fn load(&self, message_id: Uuid) -> Result<Option<Message>, DomainError>;

    /// Conversation between `owner` and `contact`, newest first.
    async fn index(
        &self,
        owner: &str,
        contact: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError>;

    /// Pending outgoing messages of `owner`, oldest first.
    async fn outstanding(&self, owner: &str, limit: u32) -> Result<Vec<Message>, DomainError>;
}
