//! WebSocket route configuration
//!
//! `GET /ws` - WebSocket upgrade for the streaming translation session.
//!
//! After upgrade, clients send:
//! 1. An optional `config` text frame to select the language pair
//! 2. Binary audio frames (WebM/Opus chunks from `MediaRecorder`)
//!
//! Server responds with text frames:
//! - `result` with the transcript, translation and base64 MP3 audio
//! - `error` on stream or session failures
//!
//! ```json
//! {"type": "config", "sourceLanguage": "en-US", "targetLanguage": "hi-IN"}
//! ```

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::ws::websocket_handler;
use crate::state::AppState;
use std::sync::Arc;

pub fn ws_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
}
