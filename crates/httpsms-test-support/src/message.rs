//! In-memory message repository.

use std::sync::Mutex;

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use httpsms_message::domain::message::{Message, MessageStatus};
use httpsms_message::domain::repository::MessageRepository;
use uuid::Uuid;

/// Keeps messages in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a stored message.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, message_id: Uuid) -> Option<Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
    }

    /// Returns every stored message.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn all(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn store(&self, message: &Message) -> Result<(), DomainError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn update(&self, message: &Message) -> Result<(), DomainError> {
        let mut messages = self.messages.lock().unwrap();
        let slot = messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or_else(|| DomainError::not_found("message", message.id))?;
        *slot = message.clone();
        Ok(())
    }

    async fn load(&self, message_id: Uuid) -> Result<Option<Message>, DomainError> {
        Ok(self.get(message_id))
    }

    async fn index(
        &self,
        owner: &str,
        contact: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Message>, DomainError> {
        let mut conversation: Vec<Message> = self
            .all()
            .into_iter()
            .filter(|m| m.owner == owner && m.contact == contact)
            .collect();
        conversation.sort_by(|a, b| b.order_timestamp.cmp(&a.order_timestamp));
        Ok(conversation
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn outstanding(&self, owner: &str, limit: u32) -> Result<Vec<Message>, DomainError> {
        let mut pending: Vec<Message> = self
            .all()
            .into_iter()
            .filter(|m| m.owner == owner && m.status == MessageStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.request_received_at.cmp(&b.request_received_at));
        pending.truncate(limit as usize);
        Ok(pending)
    }
}
