//! Route composition. Each concern builds its own `Router`; `main`
//! merges them and attaches the static client fallback.

pub mod api;
pub mod ws;

pub use api::api_routes;
pub use ws::ws_routes;
