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
use crate::features::annotations::dtos::{
    AnnotationResponseDto, CreateAnnotationDto, DeleteAnnotationResponseDto,
};
use crate::features::annotations::services::AnnotationService;
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

/// List annotations on a media item in timeline order
#[utoipa::path(
    get,
    path = "/api/annotations/{media_id}",
    params(
        ("media_id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Annotations", body = ApiResponse<Vec<AnnotationResponseDto>>),
        (status = 403, description = "No access to this media"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "annotations"
)]
pub async fn list_annotations(
    user: CurrentUser,
    State(service): State<Arc<AnnotationService>>,
    AppPath(media_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<AnnotationResponseDto>>>> {
    let annotations = service.list(media_id, user.id()).await?;
    let dtos: Vec<AnnotationResponseDto> = annotations.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Add an annotation (reviewer or owner)
#[utoipa::path(
    post,
    path = "/api/annotations",
    request_body = CreateAnnotationDto,
    responses(
        (status = 201, description = "Annotation created", body = ApiResponse<AnnotationResponseDto>),
        (status = 400, description = "Invalid shape or timestamp"),
        (status = 403, description = "Reviewer permission required"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "annotations"
)]
pub async fn create_annotation(
    user: CurrentUser,
    State(service): State<Arc<AnnotationService>>,
    AppJson(dto): AppJson<CreateAnnotationDto>,
) -> Result<(StatusCode, Json<ApiResponse<AnnotationResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let annotation = service.create(dto, user.id()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(annotation.into()), None, None)),
    ))
}

/// Delete an annotation (author or media owner)
#[utoipa::path(
    delete,
    path = "/api/annotations/{id}",
    params(
        ("id" = Uuid, Path, description = "Annotation ID")
    ),
    responses(
        (status = 200, description = "Annotation deleted", body = ApiResponse<DeleteAnnotationResponseDto>),
        (status = 403, description = "Not the author or media owner"),
        (status = 404, description = "Annotation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "annotations"
)]
pub async fn delete_annotation(
    user: CurrentUser,
    State(service): State<Arc<AnnotationService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteAnnotationResponseDto>>> {
    service.delete(id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteAnnotationResponseDto { deleted: true }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::features::annotations::routes::routes;
    use crate::features::annotations::services::AnnotationService;
    use crate::features::media::AccessService;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    fn server() -> TestServer {
        let pool = lazy_pool();
        let access = Arc::new(AccessService::new(pool.clone()));
        let service = Arc::new(AnnotationService::new(pool, access));
        TestServer::new(with_test_user(routes(service))).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_frame_shape() {
        let response = server()
            .post("/api/annotations")
            .json(&json!({
                "media_id": uuid::Uuid::new_v4(),
                "timestamp": 1.0,
                "shape": {"type": "circle", "x": 1.2, "y": 0.5, "radius": 0.1}
            }))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_shape_type() {
        let response = server()
            .post("/api/annotations")
            .json(&json!({
                "media_id": uuid::Uuid::new_v4(),
                "timestamp": 1.0,
                "shape": {"type": "polygon", "points": []}
            }))
            .await;

        response.assert_status_bad_request();
    }
}
