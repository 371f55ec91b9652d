//! `PostgreSQL` repositories for the httpsms API.
//!
//! Queries are built at runtime with `sqlx::query` and rows are mapped by
//! column name. The schema lives in the workspace `migrations/` directory.

pub mod pg_event_listener_log_repository;
pub mod pg_event_repository;
pub mod pg_heartbeat_repository;
pub mod pg_message_repository;
pub mod pg_message_thread_repository;

mod convert;
