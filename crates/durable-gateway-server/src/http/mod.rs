//! Operational HTTP endpoints for the gateway.
//!
//! Provides endpoints for:
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::host::ServiceHost;
use crate::metrics::GatewayMetrics;

mod handlers;

/// State shared with the HTTP handlers.
pub struct OpsState {
    pub host: Arc<ServiceHost>,
    pub metrics: Arc<GatewayMetrics>,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<OpsState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
