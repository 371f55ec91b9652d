//! The event dispatcher.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use httpsms_core::error::DomainError;
use httpsms_core::event::{Event, EventType};
use httpsms_core::repository::EventRepository;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::panic::panic_message;
use crate::registry::{SubscribeError, SubscriptionRegistry};

/// One listener that did not complete for a published event.
#[derive(Debug)]
pub struct ListenerFailure {
    /// The listener that failed or was skipped.
    pub listener_name: String,
    /// Why it failed.
    pub error: DomainError,
}

/// Why a publish did not fully succeed.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be stored; no listener ran.
    #[error("cannot store event {event_id}: {source}")]
    Store {
        /// The event that was being published.
        event_id: Uuid,
        /// The repository error.
        #[source]
        source: DomainError,
    },

    /// Some listeners failed. All others still ran.
    #[error("{} listener(s) failed for event {event_id}", .failures.len())]
    Listeners {
        /// The event that was being published.
        event_id: Uuid,
        /// Failures in registration order.
        failures: Vec<ListenerFailure>,
    },
}

impl PublishError {
    /// Turns a publish outcome into a request outcome.
    ///
    /// Listener failures are recorded in the listener log and do not fail the
    /// publishing request; they are logged here and dropped. A store failure
    /// is returned as the underlying `DomainError`.
    ///
    /// # Errors
    ///
    /// Returns the repository error of `PublishError::Store`.
    pub fn tolerate_listener_failures(self) -> Result<(), DomainError> {
        match self {
            PublishError::Store { source, .. } => Err(source),
            PublishError::Listeners { event_id, failures } => {
                for failure in &failures {
                    warn!(
                        %event_id,
                        listener = %failure.listener_name,
                        error = %failure.error,
                        "listener failed; left for redelivery"
                    );
                }
                Ok(())
            }
        }
    }
}

/// Stores events and fans them out to subscribed listeners.
///
/// The subscription table is installed once by the composition root and is
/// read without locking afterwards.
pub struct EventDispatcher {
    events: Arc<dyn EventRepository>,
    subscriptions: OnceLock<SubscriptionRegistry>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no subscription table yet.
    #[must_use]
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self {
            events,
            subscriptions: OnceLock::new(),
        }
    }

    /// Creates a dispatcher with an already built table.
    #[must_use]
    pub fn with_registry(events: Arc<dyn EventRepository>, registry: SubscriptionRegistry) -> Self {
        Self {
            events,
            subscriptions: OnceLock::from(registry),
        }
    }

    /// Installs the subscription table.
    ///
    /// # Errors
    ///
    /// Returns `SubscribeError::AlreadyInstalled` on a second call.
    pub fn install(&self, registry: SubscriptionRegistry) -> Result<(), SubscribeError> {
        self.subscriptions
            .set(registry)
            .map_err(|_| SubscribeError::AlreadyInstalled)
    }

    /// Whether a subscription table has been installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.subscriptions.get().is_some()
    }

    /// Listener names subscribed to `event_type`, in delivery order.
    #[must_use]
    pub fn listener_names(&self, event_type: EventType) -> Vec<&str> {
        self.subscriptions
            .get()
            .map(|registry| registry.listener_names(event_type))
            .unwrap_or_default()
    }

    /// Stores `event` and delivers it to every listener of its type.
    ///
    /// Listeners run one after another on the caller's task, in registration
    /// order. An error or panic in one listener is recorded and the next
    /// listener still runs. Listeners that have not started when `cancel`
    /// fires are skipped and reported as `DomainError::Cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Store` if the event cannot be stored, or
    /// `PublishError::Listeners` listing every listener that did not succeed.
    #[instrument(skip_all, fields(event_id = %event.id(), event_type = %event.event_type()))]
    pub async fn publish(
        &self,
        cancel: &CancellationToken,
        event: &Event,
    ) -> Result<(), PublishError> {
        self.events
            .save(event)
            .await
            .map_err(|source| {
                error!(error = %source, "cannot store event");
                PublishError::Store {
                    event_id: event.id(),
                    source,
                }
            })?;

        let Some(registry) = self.subscriptions.get() else {
            warn!("publish before the subscription table was installed");
            return Ok(());
        };

        let subscribers = registry.subscribers(event.event_type());
        if subscribers.is_empty() {
            debug!("no listeners subscribed");
            return Ok(());
        }

        let mut failures = Vec::new();
        for subscriber in subscribers {
            if cancel.is_cancelled() {
                debug!(listener = %subscriber.name, "cancelled before listener started");
                failures.push(ListenerFailure {
                    listener_name: subscriber.name.clone(),
                    error: DomainError::Cancelled,
                });
                continue;
            }

            let outcome = AssertUnwindSafe(subscriber.listener.handle(cancel, event))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => debug!(listener = %subscriber.name, "listener handled event"),
                Ok(Err(err)) => {
                    error!(listener = %subscriber.name, error = %err, "listener failed");
                    failures.push(ListenerFailure {
                        listener_name: subscriber.name.clone(),
                        error: err,
                    });
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(listener = %subscriber.name, panic = %message, "listener panicked");
                    failures.push(ListenerFailure {
                        listener_name: subscriber.name.clone(),
                        error: DomainError::Infrastructure(format!(
                            "listener panicked: {message}"
                        )),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError::Listeners {
                event_id: event.id(),
                failures,
            })
        }
    }
}
