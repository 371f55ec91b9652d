//! Subscription table built by the composition root.

use std::collections::HashMap;
use std::sync::Arc;

use httpsms_core::event::EventType;
use thiserror::Error;

use crate::listener::EventListener;

/// Configuration errors raised while wiring listeners.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubscribeError {
    /// A listener name was registered twice for one event type.
    #[error("listener {listener_name} is already subscribed to {event_type}")]
    DuplicateListener {
        /// The event type.
        event_type: EventType,
        /// The repeated listener name.
        listener_name: String,
    },

    /// The dispatcher already has a subscription table.
    #[error("the dispatcher subscription table is already installed")]
    AlreadyInstalled,
}

/// A named listener bound to an event type.
pub struct Subscription {
    /// Topic the listener reacts to.
    pub event_type: EventType,
    /// Name recorded in the listener log; unique per topic.
    pub listener_name: String,
    /// The listener itself.
    pub listener: Arc<dyn EventListener>,
}

pub(crate) struct Subscriber {
    pub(crate) name: String,
    pub(crate) listener: Arc<dyn EventListener>,
}

/// Event type → ordered listeners.
#[derive(Default)]
pub struct SubscriptionRegistry {
    table: HashMap<EventType, Vec<Subscriber>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the subscribers of `event_type`.
    ///
    /// # Errors
    ///
    /// Returns `SubscribeError::DuplicateListener` if `listener_name` is
    /// already subscribed to `event_type`.
    pub fn subscribe(
        &mut self,
        event_type: EventType,
        listener_name: impl Into<String>,
        listener: Arc<dyn EventListener>,
    ) -> Result<(), SubscribeError> {
        let listener_name = listener_name.into();
        let subscribers = self.table.entry(event_type).or_default();
        if subscribers.iter().any(|s| s.name == listener_name) {
            return Err(SubscribeError::DuplicateListener {
                event_type,
                listener_name,
            });
        }
        subscribers.push(Subscriber {
            name: listener_name,
            listener,
        });
        Ok(())
    }

    /// Subscribes every entry of a listener group, stopping at the first
    /// duplicate.
    ///
    /// # Errors
    ///
    /// Returns the first `SubscribeError::DuplicateListener`.
    pub fn register(
        &mut self,
        subscriptions: impl IntoIterator<Item = Subscription>,
    ) -> Result<(), SubscribeError> {
        for subscription in subscriptions {
            self.subscribe(
                subscription.event_type,
                subscription.listener_name,
                subscription.listener,
            )?;
        }
        Ok(())
    }

    /// Listener names for `event_type`, in registration order.
    #[must_use]
    pub fn listener_names(&self, event_type: EventType) -> Vec<&str> {
        self.subscribers(event_type)
            .iter()
            .map(|s| s.name.as_str())
            .collect()
    }

    /// Total number of subscriptions across all event types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Whether nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn subscribers(&self, event_type: EventType) -> &[Subscriber] {
        self.table
            .get(&event_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
