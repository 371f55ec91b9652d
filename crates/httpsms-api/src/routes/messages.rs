//! Routes for the Message bounded context.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use httpsms_core::clock::Clock;
use httpsms_message::domain::commands::{
    GetOutstanding, MessageIndex, PhoneEventName, ReceiveMessage, SendMessage, StorePhoneEvent,
};
use httpsms_message::domain::message::Message;
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;
use crate::validators;

/// Request body for POST /send.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// The owner's phone that will send the SMS.
    pub from: String,
    /// The recipient.
    pub to: String,
    /// Text body.
    pub content: String,
}

/// Request body for POST /receive.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiveMessageRequest {
    /// The sender.
    pub from: String,
    /// The owner's phone that received the SMS.
    pub to: String,
    /// Text body.
    pub content: String,
    /// When the phone received it.
    pub timestamp: DateTime<Utc>,
}

/// Query of GET /outstanding.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OutstandingQuery {
    /// The fetching phone.
    pub owner: String,
    /// Messages to hand out, 10 by default.
    pub limit: Option<u32>,
}

/// Request body for POST /{id}/events.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PhoneEventRequest {
    /// `SENT`, `DELIVERED` or `FAILED`.
    pub event_name: PhoneEventName,
    /// When it happened on the phone.
    pub timestamp: DateTime<Utc>,
    /// Failure reason for `FAILED`.
    pub reason: Option<String>,
}

/// Query of GET /.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndexQuery {
    /// The owner's phone.
    pub owner: String,
    /// The other party.
    pub contact: String,
    /// Rows to skip.
    pub skip: Option<u32>,
    /// Page size, 20 by default.
    pub limit: Option<u32>,
}

/// Queue an SMS for the owner's phone to send.
#[utoipa::path(
    post,
    path = "/v1/messages/send",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored as pending", body = Message),
        (status = 400, description = "Invalid phone number or content", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity"),
    ),
    tag = "messages"
)]
#[instrument(skip_all)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let command = SendMessage {
        owner: validators::phone_number("from", &request.from)?,
        contact: validators::phone_number("to", &request.to)?,
        content: validators::content(&request.content)?,
        request_received_at: state.clock.now(),
    };

    let message = state
        .message_service
        .send_message(&state.request_token(), &command)
        .await?;

    info!(message_id = %message.id, "message accepted");
    Ok(Json(message))
}

/// Store an SMS received by the owner's phone.
#[utoipa::path(
    post,
    path = "/v1/messages/receive",
    request_body = ReceiveMessageRequest,
    responses(
        (status = 200, description = "Inbound message stored", body = Message),
        (status = 400, description = "Invalid phone number or content", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity"),
    ),
    tag = "messages"
)]
#[instrument(skip_all)]
pub async fn receive_message(
    State(state): State<AppState>,
    Json(request): Json<ReceiveMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let command = ReceiveMessage {
        owner: validators::phone_number("to", &request.to)?,
        contact: validators::phone_number("from", &request.from)?,
        content: validators::content(&request.content)?,
        timestamp: request.timestamp,
    };

    let message = state
        .message_service
        .receive_message(&state.request_token(), &command)
        .await?;
    Ok(Json(message))
}

/// Hand pending messages to the owner's phone.
#[utoipa::path(
    get,
    path = "/v1/messages/outstanding",
    params(OutstandingQuery),
    responses(
        (status = 200, description = "Messages now marked as sending", body = [Message]),
        (status = 400, description = "Invalid owner or limit", body = ErrorBody),
    ),
    tag = "messages"
)]
#[instrument(skip_all, fields(owner = %query.owner))]
pub async fn outstanding(
    State(state): State<AppState>,
    Query(query): Query<OutstandingQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let command = GetOutstanding {
        owner: validators::phone_number("owner", &query.owner)?,
        limit: validators::limit(
            query.limit,
            validators::DEFAULT_OUTSTANDING_LIMIT,
            validators::MAX_PAGE_LIMIT,
        )?,
    };

    let messages = state
        .message_service
        .get_outstanding(&state.request_token(), &command)
        .await?;
    Ok(Json(messages))
}

/// Report SENT, DELIVERED or FAILED for a message.
#[utoipa::path(
    post,
    path = "/v1/messages/{id}/events",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = PhoneEventRequest,
    responses(
        (status = 200, description = "Message after the report was applied", body = Message),
        (status = 404, description = "Message not found", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity"),
    ),
    tag = "messages"
)]
#[instrument(skip(state, request))]
pub async fn store_event(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Json(request): Json<PhoneEventRequest>,
) -> Result<Json<Message>, ApiError> {
    let command = StorePhoneEvent {
        message_id,
        event_name: request.event_name,
        timestamp: request.timestamp,
        reason: request.reason,
    };

    let message = state
        .message_service
        .store_phone_event(&state.request_token(), &command)
        .await?;
    Ok(Json(message))
}

/// List the conversation between an owner and a contact.
#[utoipa::path(
    get,
    path = "/v1/messages",
    params(IndexQuery),
    responses(
        (status = 200, description = "Messages, newest first", body = [Message]),
        (status = 400, description = "Invalid query", body = ErrorBody),
    ),
    tag = "messages"
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let (skip, limit) = validators::page(query.skip, query.limit)?;
    let index = MessageIndex {
        owner: validators::phone_number("owner", &query.owner)?,
        contact: validators::phone_number("contact", &query.contact)?,
        skip,
        limit,
    };

    Ok(Json(state.message_service.index(&index).await?))
}

/// Returns the router for the message context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/send", post(send_message))
        .route("/receive", post(receive_message))
        .route("/outstanding", get(outstanding))
        .route("/{id}/events", post(store_event))
}
