use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath};
use crate::features::comments::dtos::{
    CommentResponseDto, CreateCommentDto, DeleteCommentResponseDto, UpdateCommentDto,
};
use crate::features::comments::services::CommentService;
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

/// List comments on a media item
///
/// Timeline comments come first ordered by timestamp, then general comments
/// by creation time.
#[utoipa::path(
    get,
    path = "/api/comments/{media_id}",
    params(
        ("media_id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentResponseDto>>),
        (status = 403, description = "No access to this media"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn list_comments(
    user: CurrentUser,
    State(service): State<Arc<CommentService>>,
    AppPath(media_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = service.list(media_id, user.id()).await?;
    let dtos: Vec<CommentResponseDto> = comments.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Add a comment (reviewer or owner)
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Reviewer permission required"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    user: CurrentUser,
    State(service): State<Arc<CommentService>>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.create(dto, user.id()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment.into()), None, None)),
    ))
}

/// Edit a comment (author only)
#[utoipa::path(
    patch,
    path = "/api/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentDto,
    responses(
        (status = 200, description = "Comment updated", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn update_comment(
    user: CurrentUser,
    State(service): State<Arc<CommentService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateCommentDto>,
) -> Result<Json<ApiResponse<CommentResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.update(id, user.id(), &dto.content).await?;
    Ok(Json(ApiResponse::success(Some(comment.into()), None, None)))
}

/// Delete a comment (author or media owner)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<DeleteCommentResponseDto>),
        (status = 403, description = "Not the author or media owner"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    user: CurrentUser,
    State(service): State<Arc<CommentService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteCommentResponseDto>>> {
    service.delete(id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteCommentResponseDto { deleted: true }),
        None,
        None,
    )))
}
