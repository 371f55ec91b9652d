//! In-memory message thread repository.

use std::sync::Mutex;

use async_trait::async_trait;
use httpsms_core::error::DomainError;
use httpsms_message_thread::domain::repository::MessageThreadRepository;
use httpsms_message_thread::domain::thread::MessageThread;

/// Keeps threads in insertion order; one per (owner, contact).
#[derive(Debug, Default)]
pub struct InMemoryMessageThreadRepository {
    threads: Mutex<Vec<MessageThread>>,
}

impl InMemoryMessageThreadRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored thread.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn all(&self) -> Vec<MessageThread> {
        self.threads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageThreadRepository for InMemoryMessageThreadRepository {
    async fn store(&self, thread: &MessageThread) -> Result<(), DomainError> {
        let mut threads = self.threads.lock().unwrap();
        if threads
            .iter()
            .any(|t| t.owner == thread.owner && t.contact == thread.contact)
        {
            return Err(DomainError::Infrastructure(format!(
                "duplicate thread for {} and {}",
                thread.owner, thread.contact
            )));
        }
        threads.push(thread.clone());
        Ok(())
    }

    async fn update(&self, thread: &MessageThread) -> Result<(), DomainError> {
        let mut threads = self.threads.lock().unwrap();
        let slot = threads
            .iter_mut()
            .find(|t| t.id == thread.id)
            .ok_or_else(|| DomainError::not_found("message thread", thread.id))?;
        *slot = thread.clone();
        Ok(())
    }

    async fn load_by_owner_contact(
        &self,
        owner: &str,
        contact: &str,
    ) -> Result<Option<MessageThread>, DomainError> {
        Ok(self
            .threads
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.owner == owner && t.contact == contact)
            .cloned())
    }

    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<MessageThread>, DomainError> {
        let mut threads: Vec<MessageThread> =
            self.all().into_iter().filter(|t| t.owner == owner).collect();
        threads.sort_by(|a, b| b.order_timestamp.cmp(&a.order_timestamp));
        Ok(threads
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }
}
