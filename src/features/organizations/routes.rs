use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::organizations::handlers;
use crate::features::organizations::services::OrganizationService;

/// Create routes for the organizations feature
pub fn routes(service: Arc<OrganizationService>) -> Router {
    Router::new()
        .route(
            "/api/organizations",
            get(handlers::list_organizations).post(handlers::create_organization),
        )
        .route("/api/organizations/{id}", get(handlers::get_organization))
        .route(
            "/api/organizations/{id}/members/{user_id}",
            patch(handlers::update_member_role).delete(handlers::remove_member),
        )
        .with_state(service)
}
