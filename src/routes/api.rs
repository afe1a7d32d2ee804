use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

/// Create the plain HTTP router
///
/// `GET /api/health` - liveness probe
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
}
