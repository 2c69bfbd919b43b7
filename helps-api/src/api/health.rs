//! Health check endpoint

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "helps-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Health routes, outside the envelope machinery
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}
