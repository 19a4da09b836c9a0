//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with both greeting routes
//! - Attach each route's CORS layer
//! - Wrap the routes in the replay middleware when enabled
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::cors::CorsPolicies;
use crate::greeting::{greeting_route, GreetingService, GREETING_ROUTES};
use crate::http::request::{make_request_span, RequestIdGenerator};
use crate::replay::{replay_middleware, ReplayState};

/// HTTP server for the greeting service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    greetings: GreetingService,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let greetings = GreetingService::from_config(&config.greeting);
        Self::with_service(config, greetings)
    }

    /// Create a server around an existing greeting service.
    pub fn with_service(config: ServiceConfig, greetings: GreetingService) -> Self {
        let router = Self::build_router(&config, greetings.clone());
        Self {
            router,
            config,
            greetings,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, greetings: GreetingService) -> Router {
        let policies = CorsPolicies::from_config(&config.cors);

        let mut router = Router::new();
        for path in GREETING_ROUTES {
            let mut route = greeting_route(greetings.clone(), config.greeting.allow_post);
            if let Some(cors) = policies.layer_for(path) {
                route = route.layer(cors);
            }
            router = router.route(path, route);
        }

        if config.replay.enabled {
            tracing::warn!(
                failure_mode = ?config.replay.failure_mode,
                "Replay enabled: every request runs its handler twice"
            );
            let state = ReplayState::from_config(&config.replay);
            router = router.layer(middleware::from_fn_with_state(state, replay_middleware));
        }

        router
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(SetRequestIdLayer::x_request_id(RequestIdGenerator))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            replay = self.config.replay.enabled,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The greeting service shared by every route.
    pub fn greetings(&self) -> &GreetingService {
        &self.greetings
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
