use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::media::handlers::{self, MediaState};

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the media feature
pub fn routes(state: MediaState) -> Router {
    let body_limit = state.max_upload_size + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/api/media/upload",
            post(handlers::upload_media).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/media", get(handlers::list_media))
        .route(
            "/api/media/{id}",
            get(handlers::get_media)
                .patch(handlers::update_media)
                .delete(handlers::delete_media),
        )
        .with_state(state)
}
