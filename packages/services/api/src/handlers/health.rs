//! Health check

use axum::{http::StatusCode, response::Html, Json};
use serde_json::{json, Value};

/// `GET /` heartbeat 페이지
pub async fn heartbeat() -> (StatusCode, Html<&'static str>) {
    (StatusCode::OK, Html("<h1>Heartbeat</h1>"))
}

/// `GET /health`
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
