//! Message application layer: the service and its listener group.

pub mod listeners;
pub mod service;
