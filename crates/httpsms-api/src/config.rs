//! Server configuration, read from command-line flags or the environment.

use std::net::SocketAddr;

use clap::Parser;

use crate::error::AppError;

/// Runtime configuration of the API server.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Deployment environment. `local` switches logs to a human-readable format.
    #[arg(long, env = "APP_ENV", default_value = "production")]
    pub app_env: String,

    /// Log every HTTP request and response.
    #[arg(long, env = "APP_HTTP_LOGGER")]
    pub http_logger: bool,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    /// OTLP collector endpoint. Tracing export is off when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Service name reported to the trace collector.
    #[arg(long, env = "SERVICE_NAME", default_value = "httpsms-api")]
    pub service_name: String,
}

impl Config {
    /// Whether the server runs on a developer machine.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("local")
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
