use axum::{routing::get, Router};

use crate::features::realtime::handler::{self, RealtimeState};

/// WebSocket endpoint; authenticates through the `token` query parameter
pub fn routes(state: RealtimeState) -> Router {
    Router::new()
        .route("/ws", get(handler::ws_handler))
        .with_state(state)
}
