//! httpsms: Heartbeat bounded context.
//!
//! Phones report liveness with heartbeats. Each heartbeat is stored and the
//! owner's monitor records the most recent one. A phone fetching its
//! outstanding messages also counts as a heartbeat.

pub mod application;
pub mod domain;
