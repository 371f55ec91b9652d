//! Message thread domain model.

pub mod events;
pub mod repository;
pub mod thread;
