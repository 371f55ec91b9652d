//! Route modules organized by bounded context.

pub mod docs;
pub mod health;
pub mod heartbeats;
pub mod message_threads;
pub mod messages;

use axum::Router;

use crate::state::AppState;

/// The API routes of every bounded context plus the health check.
pub fn api() -> Router<AppState> {
    Router::new()
        .nest("/v1/messages", messages::router())
        .nest("/v1/message-threads", message_threads::router())
        .nest("/v1/heartbeats", heartbeats::router())
        .merge(health::router())
}
