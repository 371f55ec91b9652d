//! httpsms Core: shared event abstractions.
//!
//! This crate defines the event model, the listener log used to make event
//! listeners idempotent, and the repository traits every other crate depends
//! on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod listener_log;
pub mod repository;
