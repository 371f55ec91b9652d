//! Message domain model.

pub mod commands;
pub mod events;
pub mod message;
pub mod repository;
