//! HTTP routes.

pub mod auth;
pub mod health;

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use serde_json::{json, Value};

/// Fallback for unknown routes.
pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "message": format!("Cannot {} {}", method, uri.path()),
        })),
    )
}
