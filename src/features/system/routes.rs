use axum::{routing::get, Router};

use crate::features::system::handlers::{self, SystemState};

/// Public routes for the banner and health probes
pub fn routes(state: SystemState) -> Router {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/health/db", get(handlers::db_health))
        .with_state(state)
}
