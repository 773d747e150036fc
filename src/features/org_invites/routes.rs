use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::org_invites::handlers;
use crate::features::org_invites::services::InviteService;

/// Create routes for the org-invites feature
pub fn routes(service: Arc<InviteService>) -> Router {
    Router::new()
        .route("/api/org-invites/send", post(handlers::send_invite))
        .route(
            "/api/org-invites/pending/{user_id}",
            get(handlers::list_pending_invites),
        )
        .route("/api/org-invites/accept/{id}", post(handlers::accept_invite))
        .route("/api/org-invites/reject/{id}", post(handlers::reject_invite))
        .with_state(service)
}
