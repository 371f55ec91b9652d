//! Routes for the MessageThread bounded context.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use httpsms_message_thread::domain::thread::MessageThread;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;
use crate::validators;

/// Query of GET /.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ThreadIndexQuery {
    /// The owner's phone.
    pub owner: String,
    /// Rows to skip.
    pub skip: Option<u32>,
    /// Page size, 20 by default.
    pub limit: Option<u32>,
}

/// List the owner's message threads.
#[utoipa::path(
    get,
    path = "/v1/message-threads",
    params(ThreadIndexQuery),
    responses(
        (status = 200, description = "Threads, most recent first", body = [MessageThread]),
        (status = 400, description = "Invalid query", body = ErrorBody),
    ),
    tag = "message-threads"
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ThreadIndexQuery>,
) -> Result<Json<Vec<MessageThread>>, ApiError> {
    let owner = validators::phone_number("owner", &query.owner)?;
    let (skip, limit) = validators::page(query.skip, query.limit)?;

    let threads = state.thread_service.get_threads(&owner, skip, limit).await?;
    Ok(Json(threads))
}

/// Returns the router for the message thread context.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use httpsms_message::domain::commands::SendMessage;
    use httpsms_test_support::InMemoryApp;
    use tokio_util::sync::CancellationToken;

    use crate::routes::testing::{call, state};

    #[tokio::test]
    async fn test_threads_list_contacts_of_owner() {
        // Arrange
        let memory = InMemoryApp::new();
        let now = memory.clock.0;
        for contact in ["+18005550100", "+18005550101"] {
            memory
                .message_service
                .send_message(
                    &CancellationToken::new(),
                    &SendMessage {
                        owner: "+18005550199".to_owned(),
                        contact: contact.to_owned(),
                        content: "hello".to_owned(),
                        request_received_at: now,
                    },
                )
                .await
                .unwrap();
        }
        let app = router().with_state(state(&memory));

        // Act
        let (status, json) = call(app, "GET", "/?owner=%2B18005550199", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let threads = json.as_array().unwrap();
        assert_eq!(threads.len(), 2);
        assert!(threads.iter().all(|t| t["status"] == "pending"));
    }

    #[tokio::test]
    async fn test_threads_for_unknown_owner_are_empty() {
        let memory = InMemoryApp::new();
        let app = router().with_state(state(&memory));

        let (status, json) = call(app, "GET", "/?owner=%2B18005550000", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_threads_require_owner() {
        let memory = InMemoryApp::new();
        let app = router().with_state(state(&memory));

        let (status, _) = call(app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
