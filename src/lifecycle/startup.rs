//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the final configuration (file plus command-line overrides)
//! - Start the metrics exporter when enabled
//! - Bind the listener and hand it to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Validate `config`, start auxiliary services and bind the listener.
pub async fn prepare(config: &ServiceConfig) -> Result<TcpListener, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        replay = config.replay.enabled,
        id_strategy = ?config.greeting.id_strategy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Run the service until `shutdown` fires.
pub async fn run(config: ServiceConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    let listener = prepare(&config).await?;
    let server = HttpServer::new(config);
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
