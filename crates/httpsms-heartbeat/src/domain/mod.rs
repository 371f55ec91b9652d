//! Heartbeat domain model.

pub mod commands;
pub mod events;
pub mod heartbeat;
pub mod repository;
