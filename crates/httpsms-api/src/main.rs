//! httpsms API server entry point.

use std::sync::Arc;

use clap::Parser;
use httpsms_api::config::Config;
use httpsms_api::container::Container;
use httpsms_api::error::AppError;
use httpsms_api::telemetry;
use httpsms_core::clock::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::parse();
    let _telemetry = telemetry::init(&config)?;

    info!(env = %config.app_env, "starting httpsms API server");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let shutdown = CancellationToken::new();
    let container = Container::build(&config, pool, Arc::new(SystemClock), shutdown.clone())?;
    let app = container.router();

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown requested");
    shutdown.cancel();
}
