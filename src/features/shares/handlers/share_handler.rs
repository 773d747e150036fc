use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath};
use crate::features::shares::dtos::{
    CreateShareDto, DeleteShareResponseDto, ShareResponseDto, SharedMediaResponseDto,
};
use crate::features::shares::services::ShareService;
use crate::features::users::CurrentUser;
use crate::shared::types::{ApiResponse, Meta};

/// List media shared with a user (the caller)
#[utoipa::path(
    get,
    path = "/api/media-shared/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID; must be the caller")
    ),
    responses(
        (status = 200, description = "Media shared with the user", body = ApiResponse<Vec<SharedMediaResponseDto>>),
        (status = 403, description = "Not the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "shares"
)]
pub async fn list_shared_with_user(
    user: CurrentUser,
    State(service): State<Arc<ShareService>>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<SharedMediaResponseDto>>>> {
    let shared = service.list_shared_with(user_id, user.id()).await?;
    let dtos: Vec<SharedMediaResponseDto> = shared.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Share a media item (owner only)
///
/// Re-sharing with a user updates their permission level.
#[utoipa::path(
    post,
    path = "/api/media-shared",
    request_body = CreateShareDto,
    responses(
        (status = 201, description = "Shares created or updated", body = ApiResponse<Vec<ShareResponseDto>>),
        (status = 400, description = "No target, or sharing with yourself"),
        (status = 403, description = "Not the media owner or not in the organization"),
        (status = 404, description = "Media or organization not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shares"
)]
pub async fn create_share(
    user: CurrentUser,
    State(service): State<Arc<ShareService>>,
    AppJson(dto): AppJson<CreateShareDto>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ShareResponseDto>>>)> {
    let shares = service.share(dto, user.id()).await?;
    let total = shares.len() as i64;
    let dtos: Vec<ShareResponseDto> = shares.into_iter().map(Into::into).collect();
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(dtos),
            Some("Media shared successfully".to_string()),
            Some(Meta { total }),
        )),
    ))
}

/// List who a media item is shared with (owner only)
#[utoipa::path(
    get,
    path = "/api/media/{id}/shares",
    params(
        ("id" = Uuid, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Shares of the media", body = ApiResponse<Vec<ShareResponseDto>>),
        (status = 403, description = "Not the media owner"),
        (status = 404, description = "Media not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shares"
)]
pub async fn list_media_shares(
    user: CurrentUser,
    State(service): State<Arc<ShareService>>,
    AppPath(media_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<ShareResponseDto>>>> {
    let shares = service.list_for_media(media_id, user.id()).await?;
    let dtos: Vec<ShareResponseDto> = shares.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Revoke a share (media owner only)
#[utoipa::path(
    delete,
    path = "/api/media-shared/{share_id}",
    params(
        ("share_id" = Uuid, Path, description = "Share ID")
    ),
    responses(
        (status = 200, description = "Share revoked", body = ApiResponse<DeleteShareResponseDto>),
        (status = 403, description = "Not the media owner"),
        (status = 404, description = "Share not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shares"
)]
pub async fn delete_share(
    user: CurrentUser,
    State(service): State<Arc<ShareService>>,
    AppPath(share_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<DeleteShareResponseDto>>> {
    service.revoke(share_id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteShareResponseDto { deleted: true }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use std::sync::Arc;

    use crate::features::media::AccessService;
    use crate::features::organizations::OrganizationService;
    use crate::features::shares::routes::routes;
    use crate::features::shares::services::ShareService;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    #[tokio::test]
    async fn test_listing_another_users_shares_is_forbidden() {
        let pool = lazy_pool();
        let service = Arc::new(ShareService::new(
            pool.clone(),
            Arc::new(AccessService::new(pool.clone())),
            Arc::new(OrganizationService::new(pool)),
        ));
        let server = TestServer::new(with_test_user(routes(service))).unwrap();

        let response = server
            .get(&format!("/api/media-shared/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }
}
