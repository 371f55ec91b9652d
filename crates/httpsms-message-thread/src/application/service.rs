//! Message thread service.

use std::sync::Arc;

use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_events::EventDispatcher;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::events::ThreadUpdated;
use crate::domain::repository::MessageThreadRepository;
use crate::domain::thread::{MessageThread, ThreadActivity};

const SOURCE_THREAD: &str = "/v1/message-threads";

/// Operations on message threads.
pub struct MessageThreadService {
    repository: Arc<dyn MessageThreadRepository>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl MessageThreadService {
    /// Creates a new `MessageThreadService`.
    #[must_use]
    pub fn new(
        repository: Arc<dyn MessageThreadRepository>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            clock,
        }
    }

    /// Creates or moves forward the thread of the activity's (owner,
    /// contact) pair and publishes `thread.updated` when it changed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the thread or the event cannot be stored.
    #[instrument(skip_all, fields(owner = %activity.owner, message_id = %activity.message_id))]
    pub async fn update_thread(
        &self,
        cancel: &CancellationToken,
        activity: &ThreadActivity,
    ) -> Result<(), DomainError> {
        let now = self.clock.now();
        let thread = match self
            .repository
            .load_by_owner_contact(&activity.owner, &activity.contact)
            .await?
        {
            None => {
                let thread = MessageThread::start(activity, now);
                self.repository.store(&thread).await?;
                debug!(thread_id = %thread.id, "thread started");
                thread
            }
            Some(mut thread) => {
                if !thread.apply(activity, now) {
                    debug!(thread_id = %thread.id, "activity older than thread, ignored");
                    return Ok(());
                }
                self.repository.update(&thread).await?;
                thread
            }
        };

        let payload = ThreadUpdated {
            thread_id: thread.id,
            owner: thread.owner.clone(),
            contact: thread.contact.clone(),
            last_message_id: thread.last_message_id,
            status: thread.status,
            order_timestamp: thread.order_timestamp,
        };
        let event = Event::new(
            EventType::ThreadUpdated,
            SOURCE_THREAD,
            &payload,
            self.clock.as_ref(),
        )?;
        match self.dispatcher.publish(cancel, &event).await {
            Ok(()) => Ok(()),
            Err(err) => err.tolerate_listener_failures(),
        }
    }

    /// Threads of `owner`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the repository fails.
    pub async fn get_threads(
        &self,
        owner: &str,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<MessageThread>, DomainError> {
        self.repository.index(owner, skip, limit).await
    }
}
