//! httpsms: Message Thread bounded context.
//!
//! Keeps one thread per (owner, contact) pair summarising the latest
//! message of the conversation. Threads are maintained by listeners on the
//! message events.

pub mod application;
pub mod domain;
