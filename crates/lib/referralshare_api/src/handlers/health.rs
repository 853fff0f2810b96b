//! Liveness probe.

use axum::Json;

/// `GET /health`: the process is up and serving.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
