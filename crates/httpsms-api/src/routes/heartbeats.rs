//! Routes for the Heartbeat bounded context.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use httpsms_core::clock::Clock;
use httpsms_heartbeat::domain::commands::StoreHeartbeat;
use httpsms_heartbeat::domain::heartbeat::{Heartbeat, HeartbeatMonitor};
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;
use crate::validators;

/// Request body for POST /.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreHeartbeatRequest {
    /// The reporting phone.
    pub owner: String,
    /// When the phone reported; defaults to the time of the request.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Query of GET /.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HeartbeatIndexQuery {
    /// The reporting phone.
    pub owner: String,
    /// Rows to skip.
    pub skip: Option<u32>,
    /// Page size, 20 by default.
    pub limit: Option<u32>,
}

/// Query of GET /monitor.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonitorQuery {
    /// The monitored phone.
    pub owner: String,
}

/// Record a heartbeat from the owner's phone.
#[utoipa::path(
    post,
    path = "/v1/heartbeats",
    request_body = StoreHeartbeatRequest,
    responses(
        (status = 200, description = "Heartbeat stored", body = Heartbeat),
        (status = 400, description = "Invalid owner", body = ErrorBody),
        (status = 422, description = "Unprocessable Entity"),
    ),
    tag = "heartbeats"
)]
#[instrument(skip_all)]
pub async fn store(
    State(state): State<AppState>,
    Json(request): Json<StoreHeartbeatRequest>,
) -> Result<Json<Heartbeat>, ApiError> {
    let command = StoreHeartbeat {
        owner: validators::phone_number("owner", &request.owner)?,
        timestamp: request.timestamp.unwrap_or_else(|| state.clock.now()),
    };

    let heartbeat = state
        .heartbeat_service
        .store(&state.request_token(), &command)
        .await?;
    Ok(Json(heartbeat))
}

/// List the owner's heartbeats.
#[utoipa::path(
    get,
    path = "/v1/heartbeats",
    params(HeartbeatIndexQuery),
    responses(
        (status = 200, description = "Heartbeats, newest first", body = [Heartbeat]),
        (status = 400, description = "Invalid query", body = ErrorBody),
    ),
    tag = "heartbeats"
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HeartbeatIndexQuery>,
) -> Result<Json<Vec<Heartbeat>>, ApiError> {
    let owner = validators::phone_number("owner", &query.owner)?;
    let (skip, limit) = validators::page(query.skip, query.limit)?;

    Ok(Json(state.heartbeat_service.index(&owner, skip, limit).await?))
}

/// When the owner's phone was last seen.
#[utoipa::path(
    get,
    path = "/v1/heartbeats/monitor",
    params(MonitorQuery),
    responses(
        (status = 200, description = "The owner's monitor", body = HeartbeatMonitor),
        (status = 404, description = "No heartbeat from the owner yet", body = ErrorBody),
    ),
    tag = "heartbeats"
)]
pub async fn monitor(
    State(state): State<AppState>,
    Query(query): Query<MonitorQuery>,
) -> Result<Json<HeartbeatMonitor>, ApiError> {
    let owner = validators::phone_number("owner", &query.owner)?;
    Ok(Json(state.heartbeat_service.monitor(&owner).await?))
}

/// Returns the router for the heartbeat context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(store))
        .route("/monitor", get(monitor))
}
