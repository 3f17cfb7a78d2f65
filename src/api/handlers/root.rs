//! Handler for the service root.

use axum::Json;
use serde_json::{Value, json};

/// `GET /`
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "URL Shortener API" }))
}
