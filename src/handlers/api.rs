//! Plain HTTP handlers.

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Returns 200 with a small JSON body.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "voicebridge is healthy."
    }))
}
