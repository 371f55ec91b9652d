//! OpenAPI documentation and the catch-all 404.

use axum::extract::OriginalUri;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use httpsms_heartbeat::domain::heartbeat::{Heartbeat, HeartbeatMonitor};
use httpsms_message::domain::commands::PhoneEventName;
use httpsms_message::domain::message::{Message, MessageStatus, MessageType};
use httpsms_message_thread::domain::thread::MessageThread;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::error::ErrorBody;
use crate::routes::{health, heartbeats, message_threads, messages};
use crate::state::AppState;

/// Where the generated OpenAPI document is served.
pub const OPENAPI_JSON: &str = "/docs/openapi.json";

/// The OpenAPI document of the public API.
///
/// A handler only shows up in the document once it is listed here.
#[derive(OpenApi)]
#[openapi(
    info(title = "httpsms API"),
    paths(
        health::health_check,
        messages::send_message,
        messages::receive_message,
        messages::outstanding,
        messages::store_event,
        messages::index,
        message_threads::index,
        heartbeats::store,
        heartbeats::index,
        heartbeats::monitor,
    ),
    components(schemas(
        Message,
        MessageType,
        MessageStatus,
        PhoneEventName,
        MessageThread,
        Heartbeat,
        HeartbeatMonitor,
        ErrorBody,
        messages::SendMessageRequest,
        messages::ReceiveMessageRequest,
        messages::PhoneEventRequest,
        heartbeats::StoreHeartbeatRequest,
    )),
    tags(
        (name = "messages", description = "Outgoing and inbound SMS"),
        (name = "message-threads", description = "One conversation per owner and contact"),
        (name = "heartbeats", description = "Phone liveness"),
        (name = "health", description = "Service liveness"),
    )
)]
pub struct ApiDoc;

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    let body = ErrorBody {
        error: "not_found",
        message: format!("no route for {method} {}; see /docs", uri.path()),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Serves the OpenAPI document and a RapiDoc UI at `/docs`.
pub fn router() -> Router<AppState> {
    Router::new().merge(RapiDoc::with_openapi(OPENAPI_JSON, ApiDoc::openapi()).path("/docs"))
}
