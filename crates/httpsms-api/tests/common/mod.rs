//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use httpsms_api::config::Config;
use httpsms_api::container::Container;
use httpsms_test_support::FixedClock;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const OWNER: &str = "+18005550199";
pub const CONTACT: &str = "+18005550100";

fn config() -> Config {
    Config {
        database_url: String::new(),
        host: "127.0.0.1".to_owned(),
        port: 0,
        app_env: "local".to_owned(),
        http_logger: false,
        database_max_connections: 1,
        otlp_endpoint: None,
        service_name: "httpsms-api-test".to_owned(),
    }
}

/// Build the full app router over `pool` with a fixed clock. Wired by the
/// same `Container` as `main.rs`.
pub fn build_test_app(pool: PgPool) -> Router {
    let container = Container::build(
        &config(),
        pool,
        Arc::new(FixedClock::standard()),
        CancellationToken::new(),
    )
    .unwrap();
    container.router()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Percent-encodes the `+` of a phone number for a query string.
pub fn query_phone(phone: &str) -> String {
    phone.replace('+', "%2B")
}
