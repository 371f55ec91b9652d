//! Shared test doubles and fixtures for the httpsms crates.

mod app;
mod clock;
mod heartbeat;
mod listener;
mod message;
mod repository;
mod thread;

pub use app::InMemoryApp;
pub use clock::FixedClock;
pub use heartbeat::InMemoryHeartbeatRepository;
pub use listener::{Journal, ListenerBehavior, RecordingListener};
pub use message::InMemoryMessageRepository;
pub use repository::{
    FailingEventListenerLogRepository, FailingEventRepository, InMemoryEventListenerLogRepository,
    InMemoryEventRepository, SaveFailingEventListenerLogRepository,
};
pub use thread::InMemoryMessageThreadRepository;
