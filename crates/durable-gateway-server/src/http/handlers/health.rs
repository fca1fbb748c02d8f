//! Health and metrics handlers.

use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, Json};

use crate::http::OpsState;

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<OpsState>>) -> impl IntoResponse {
    let listening = state.host.is_listening().await;
    Json(serde_json::json!({ "status": "ok", "listening": listening }))
}

/// Prometheus metrics endpoint.
pub async fn metrics_handler(State(state): State<Arc<OpsState>>) -> impl IntoResponse {
    let body = state.metrics.render();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
