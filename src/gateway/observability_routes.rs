//! Observability HTTP Routes
//!
//! Health check, executor counters, and the request log middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::state::GatewayState;
use crate::observability::{Logger, MetricsSnapshot, Timer};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create observability routes
pub fn observability_routes(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn metrics_handler(State(state): State<Arc<GatewayState>>) -> Json<MetricsSnapshot> {
    Json(state.executor.metrics().snapshot())
}

/// Log one `HTTP_REQUEST` line per request
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let timer = Timer::new();

    let response = next.run(request).await;

    let status = response.status();
    let status_str = status.as_u16().to_string();
    let elapsed = timer.elapsed_ms();
    let fields = [
        ("duration_ms", elapsed.as_str()),
        ("method", method.as_str()),
        ("path", path.as_str()),
        ("status", status_str.as_str()),
    ];
    if status.is_server_error() {
        Logger::warn("HTTP_REQUEST", &fields);
    } else {
        Logger::info("HTTP_REQUEST", &fields);
    }

    response
}
