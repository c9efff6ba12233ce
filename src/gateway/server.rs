//! # Gateway Server
//!
//! Combines all endpoint routers and serves them both at the root and under
//! the configured deployment prefix.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::event_routes::event_routes;
use super::observability_routes::{log_request, observability_routes};
use super::program_routes::program_routes;
use super::questionnaire_routes::questionnaire_routes;
use super::state::GatewayState;
use super::student_routes::student_routes;
use crate::observability::Logger;

/// HTTP server for the gateway
pub struct GatewayServer {
    config: HttpServerConfig,
    router: Router,
}

impl GatewayServer {
    /// Create a server over the given handler state
    pub fn new(config: HttpServerConfig, state: GatewayState) -> Self {
        let router = Self::build_router(&config, Arc::new(state));
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<GatewayState>) -> Router {
        let api = Router::new()
            .merge(observability_routes(state.clone()))
            .merge(student_routes(state.clone()))
            .merge(program_routes(state.clone()))
            .merge(questionnaire_routes(state.clone()))
            .merge(event_routes(state));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        // Requests arriving through the reverse proxy keep its mount point
        let router = match config.mount_prefix() {
            Some(prefix) => Router::new().nest(prefix, api.clone()).merge(api),
            None => api,
        };

        router
            .layer(middleware::from_fn(log_request))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address: {}", e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        Logger::info(
            "GATEWAY_START",
            &[
                ("addr", bound.as_str()),
                ("prefix", self.config.path_prefix.as_str()),
            ],
        );

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
