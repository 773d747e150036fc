use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::media::dtos::{
    normalize_content_type, DeleteMediaResponseDto, ListMediaQuery, MediaDetailResponseDto,
    MediaResponseDto, UpdateMediaDto, UploadMediaDto,
};
use crate::features::media::services::{MediaService, NewMedia};
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

const MAX_TITLE_CHARS: usize = 255;

/// State for media handlers
#[derive(Clone)]
pub struct MediaState {
    pub service: Arc<MediaService>,
    pub max_upload_size: usize,
}

fn multipart_error(e: MultipartError, max_upload_size: usize) -> AppError {
    debug!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(max_upload_size);
    }
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

fn too_large(max_upload_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File too large. Maximum size is {} bytes ({} MB)",
        max_upload_size,
        max_upload_size / 1024 / 1024
    ))
}

/// Upload an image or video
///
/// Accepts multipart/form-data with:
/// - `file`: the image or video (required)
/// - `title`: display title (required)
/// - `type`: "image" or "video" (optional, detected from the file)
#[utoipa::path(
    post,
    path = "/api/media/upload",
    tag = "media",
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Media upload form",
    ),
    responses(
        (status = 201, description = "File uploaded successfully", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Missing field, unsupported file type or type mismatch"),
        (status = 401, description = "Authentication required"),
        (status = 413, description = "File too large")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_media(
    user: CurrentUser,
    State(state): State<MediaState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaResponseDto>>)> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut title: Option<String> = None;
    let mut requested_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, state.max_upload_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(normalize_content_type)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, state.max_upload_size))?;

                file = Some((data.to_vec(), file_name, content_type));
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, state.max_upload_size))?,
                );
            }
            "type" => {
                requested_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(e, state.max_upload_size))?,
                );
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let (data, original_filename, content_type) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Title is required".to_string()))?;
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }

    if data.len() > state.max_upload_size {
        return Err(too_large(state.max_upload_size));
    }
    let media_type = MediaService::resolve_media_type(&content_type, requested_type.as_deref())?;

    let media = state
        .service
        .upload(
            NewMedia {
                data,
                original_filename,
                content_type,
                title,
                media_type,
            },
            user.id(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(media.into()),
            Some("File uploaded successfully".to_string()),
            None,
        )),
    ))
}

/// List the caller's own media
#[utoipa::path(
    get,
    path = "/api/media",
    params(ListMediaQuery),
    responses(
        (status = 200, description = "Caller's media", body = ApiResponse<Vec<MediaResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "media"
)]
pub async fn list_media(
    user: CurrentUser,
    State(state): State<MediaState>,
    AppQuery(query): AppQuery<ListMediaQuery>,
) -> Result<Json<ApiResponse<Vec<MediaResponseDto>>>> {
    let media = state.service.list_own(user.id(), &query).await?;
    let dtos: Vec<MediaResponseDto> = media.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get a media item the caller can view
#[utoipa::path(
    get,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media found", body = ApiResponse<MediaDetailResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No access to this media"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "media"
)]
pub async fn get_media(
    user: CurrentUser,
    State(state): State<MediaState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<MediaDetailResponseDto>>> {
    let (media, permission) = state.service.get_for(id, user.id()).await?;
    let dto = MediaDetailResponseDto {
        media: media.into(),
        permission,
    };
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Rename a media item (owner only)
#[utoipa::path(
    patch,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    request_body = UpdateMediaDto,
    responses(
        (status = 200, description = "Media updated", body = ApiResponse<MediaResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only the owner can rename"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "media"
)]
pub async fn update_media(
    user: CurrentUser,
    State(state): State<MediaState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateMediaDto>,
) -> Result<Json<ApiResponse<MediaResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let media = state.service.rename(id, user.id(), &dto.title).await?;
    Ok(Json(ApiResponse::success(Some(media.into()), None, None)))
}

/// Delete a media item and everything attached to it (owner only)
#[utoipa::path(
    delete,
    path = "/api/media/{id}",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted", body = ApiResponse<DeleteMediaResponseDto>),
        (status = 403, description = "Only the owner can delete"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "media"
)]
pub async fn delete_media(
    user: CurrentUser,
    State(state): State<MediaState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteMediaResponseDto>>> {
    state.service.delete(id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteMediaResponseDto { deleted: true }),
        Some("Media deleted successfully".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    use super::MediaState;
    use crate::features::media::routes::routes;
    use crate::features::media::services::{AccessService, MediaService};
    use crate::modules::storage::LocalStorage;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    async fn server(max_upload_size: usize) -> (tempfile::TempDir, TestServer) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:5000/uploads".to_string())
            .await
            .unwrap();
        let pool = lazy_pool();
        let access = Arc::new(AccessService::new(pool.clone()));
        let service = Arc::new(MediaService::new(pool, Arc::new(storage), access));
        let state = MediaState {
            service,
            max_upload_size,
        };
        (dir, TestServer::new(with_test_user(routes(state))).unwrap())
    }

    fn file_part(bytes: &[u8], name: &str, mime: &str) -> Part {
        Part::bytes(bytes.to_vec()).file_name(name).mime_type(mime)
    }

    #[tokio::test]
    async fn test_upload_rejects_non_media_mime() {
        let (_dir, server) = server(1024).await;
        let form = MultipartForm::new()
            .add_text("title", "Invoice")
            .add_part("file", file_part(b"%PDF-1.7", "invoice.pdf", "application/pdf"));

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_upload_rejects_unlisted_mime_with_html_filename() {
        let (dir, server) = server(1024).await;
        let form = MultipartForm::new()
            .add_text("title", "Sneaky")
            .add_part(
                "file",
                file_part(b"<script>alert(1)</script>", "pwn.html", "image/x-anything"),
            );

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status_bad_request();
        assert!(!dir.path().join("media").exists());
    }

    #[tokio::test]
    async fn test_upload_rejects_svg() {
        let (dir, server) = server(1024).await;
        let form = MultipartForm::new()
            .add_text("title", "Logo")
            .add_part("file", file_part(b"<svg/>", "logo.svg", "image/svg+xml"));

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status_bad_request();
        assert!(!dir.path().join("media").exists());
    }

    #[tokio::test]
    async fn test_upload_requires_title() {
        let (_dir, server) = server(1024).await;
        let form = MultipartForm::new()
            .add_text("title", "   ")
            .add_part("file", file_part(b"\x89PNG", "frame.png", "image/png"));

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["message"], "Title is required");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let (_dir, server) = server(16).await;
        let form = MultipartForm::new()
            .add_text("title", "Too big")
            .add_part("file", file_part(&[0u8; 64], "clip.mp4", "video/mp4"));

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_rejects_type_mismatch() {
        let (_dir, server) = server(1024).await;
        let form = MultipartForm::new()
            .add_text("title", "Poster")
            .add_text("type", "video")
            .add_part("file", file_part(b"\x89PNG", "poster.png", "image/png"));

        let response = server.post("/api/media/upload").multipart(form).await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let (_dir, server) = server(1024).await;

        let response = server
            .patch(&format!("/api/media/{}", uuid::Uuid::new_v4()))
            .json(&serde_json::json!({"title": "  "}))
            .await;

        response.assert_status_bad_request();
    }
}
