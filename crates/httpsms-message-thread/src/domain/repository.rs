//! Message thread persistence port.

use async_trait::async_trait;
use httpsms_core::error::DomainError;

use super::thread::MessageThread;

/// Repository for message threads.
#[async_trait]
pub trait MessageThreadRepository: Send + Sync {
    /// Inserts a new thread.
    async fn store(&self, thread: &MessageThread) -> Result<(), DomainError>;

    /// Overwrites an existing thread.
    async fn update(&self, thread: &MessageThread) -> Result<(), DomainError>;

    /// Loads the thread between `owner` and `contact`.
    async fn load_by_owner_contact(
        &self,
        owner: &str,
        contact: &str,
    ) -> Result<Option<MessageThread>, DomainError>;

    /// Threads of `owner`, most recent activity first.
    async fn index(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<MessageThread>, DomainError>;
}
