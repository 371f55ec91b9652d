//! Listener abstraction and helpers for binding service methods as listeners.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use httpsms_core::clock::Clock;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventListenerLogRepository;
use tokio_util::sync::CancellationToken;

use crate::logged::LoggedListener;
use crate::registry::Subscription;

/// Something that reacts to a published event.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Handles one delivery of `event`. `cancel` is the publisher's
    /// cancellation token.
    async fn handle(&self, cancel: &CancellationToken, event: &Event) -> Result<(), DomainError>;
}

/// Future returned by a bound listener method.
pub type ListenerFuture<'a> = BoxFuture<'a, Result<(), DomainError>>;

/// Signature of a listener method on a group type `T`.
pub type HandlerFn<T> =
    for<'a> fn(&'a T, &'a CancellationToken, &'a Event) -> ListenerFuture<'a>;

/// Adapts a method of a shared listener group into an [`EventListener`].
pub struct BoundHandler<T> {
    target: Arc<T>,
    handler: HandlerFn<T>,
}

impl<T> BoundHandler<T> {
    /// Binds `handler` to `target`.
    #[must_use]
    pub fn new(target: Arc<T>, handler: HandlerFn<T>) -> Self {
        Self { target, handler }
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> EventListener for BoundHandler<T> {
    async fn handle(&self, cancel: &CancellationToken, event: &Event) -> Result<(), DomainError> {
        (self.handler)(self.target.as_ref(), cancel, event).await
    }
}

/// Builds the subscriptions of one listener group.
///
/// Every route is wrapped in a [`LoggedListener`] sharing the group's
/// listener-log repository and clock.
pub struct ListenerRoutes {
    logs: Arc<dyn EventListenerLogRepository>,
    clock: Arc<dyn Clock>,
    subscriptions: Vec<Subscription>,
}

impl ListenerRoutes {
    /// Starts an empty route list.
    #[must_use]
    pub fn new(logs: Arc<dyn EventListenerLogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            logs,
            clock,
            subscriptions: Vec::new(),
        }
    }

    /// Routes `event_type` to `handler` on `target` under `listener_name`.
    #[must_use]
    pub fn route<T: Send + Sync + 'static>(
        mut self,
        event_type: EventType,
        listener_name: &str,
        target: &Arc<T>,
        handler: HandlerFn<T>,
    ) -> Self {
        let inner = Arc::new(BoundHandler::new(Arc::clone(target), handler));
        let listener = LoggedListener::new(
            listener_name,
            inner,
            Arc::clone(&self.logs),
            Arc::clone(&self.clock),
        );
        self.subscriptions.push(Subscription {
            event_type,
            listener_name: listener_name.to_owned(),
            listener: Arc::new(listener),
        });
        self
    }

    /// The finished subscriptions, in route order.
    #[must_use]
    pub fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }
}
