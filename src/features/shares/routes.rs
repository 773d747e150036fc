use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::shares::handlers;
use crate::features::shares::services::ShareService;

/// Create routes for the shares feature
///
/// `/api/media-shared/{id}` takes a user id on GET and a share id on DELETE.
pub fn routes(service: Arc<ShareService>) -> Router {
    Router::new()
        .route("/api/media-shared", post(handlers::create_share))
        .route(
            "/api/media-shared/{id}",
            get(handlers::list_shared_with_user).delete(handlers::delete_share),
        )
        .route("/api/media/{id}/shares", get(handlers::list_media_shares))
        .with_state(service)
}
