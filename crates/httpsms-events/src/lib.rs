//! httpsms Events: in-process publish/subscribe.
//!
//! Services publish [`httpsms_core::event::Event`]s through an
//! [`EventDispatcher`]. The dispatcher stores the event and hands it, in
//! registration order, to every listener subscribed to its type. Listener
//! groups wrap their side effects in a [`LoggedListener`] so a redelivered
//! event never repeats work that already succeeded.

pub mod dispatcher;
pub mod listener;
pub mod logged;
pub mod registry;

mod panic;

pub use dispatcher::{EventDispatcher, ListenerFailure, PublishError};
pub use listener::{BoundHandler, EventListener, HandlerFn, ListenerFuture, ListenerRoutes};
pub use logged::LoggedListener;
pub use registry::{SubscribeError, Subscription, SubscriptionRegistry};
