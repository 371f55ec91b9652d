//! Message thread application layer.

pub mod listeners;
pub mod service;
