use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::comments::handlers;
use crate::features::comments::services::CommentService;

/// Create routes for the comments feature
///
/// `/api/comments/{id}` takes a media id on GET and a comment id on
/// PATCH/DELETE.
pub fn routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route("/api/comments", post(handlers::create_comment))
        .route(
            "/api/comments/{id}",
            get(handlers::list_comments)
                .patch(handlers::update_comment)
                .delete(handlers::delete_comment),
        )
        .with_state(service)
}
