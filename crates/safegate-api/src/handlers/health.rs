//! Health and version probes.

use axum::Json;
use serde_json::{json, Value};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /health/live
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}

/// GET /health/ready
pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

/// GET /version
pub async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
