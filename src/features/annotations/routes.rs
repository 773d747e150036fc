use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::annotations::handlers;
use crate::features::annotations::services::AnnotationService;

/// Create routes for the annotations feature
///
/// `/api/annotations/{id}` takes a media id on GET and an annotation id on
/// DELETE.
pub fn routes(service: Arc<AnnotationService>) -> Router {
    Router::new()
        .route("/api/annotations", post(handlers::create_annotation))
        .route(
            "/api/annotations/{id}",
            get(handlers::list_annotations).delete(handlers::delete_annotation),
        )
        .with_state(service)
}
