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
use crate::features::org_invites::dtos::{InviteResponseDto, SendInviteDto};
use crate::features::org_invites::services::InviteService;
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

/// Invite a user into an organization the caller owns
#[utoipa::path(
    post,
    path = "/api/org-invites/send",
    request_body = SendInviteDto,
    responses(
        (status = 201, description = "Invite sent", body = ApiResponse<InviteResponseDto>),
        (status = 400, description = "Validation error or inviting yourself"),
        (status = 403, description = "Not the organization owner"),
        (status = 404, description = "User or organization not found"),
        (status = 409, description = "Already a member or invite pending")
    ),
    security(("bearer_auth" = [])),
    tag = "org-invites"
)]
pub async fn send_invite(
    user: CurrentUser,
    State(service): State<Arc<InviteService>>,
    AppJson(dto): AppJson<SendInviteDto>,
) -> Result<(StatusCode, Json<ApiResponse<InviteResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let invite = service.send(dto, &user.0).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(invite.into()),
            Some("Invitation sent successfully".to_string()),
            None,
        )),
    ))
}

/// List pending invites addressed to the caller
#[utoipa::path(
    get,
    path = "/api/org-invites/pending/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID; must be the caller")
    ),
    responses(
        (status = 200, description = "Pending invites", body = ApiResponse<Vec<InviteResponseDto>>),
        (status = 403, description = "Not the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "org-invites"
)]
pub async fn list_pending_invites(
    user: CurrentUser,
    State(service): State<Arc<InviteService>>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<InviteResponseDto>>>> {
    let invites = service.pending_for(user_id, user.id()).await?;
    let dtos: Vec<InviteResponseDto> = invites.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Accept an invite and join the organization
#[utoipa::path(
    post,
    path = "/api/org-invites/accept/{id}",
    params(
        ("id" = Uuid, Path, description = "Invite ID")
    ),
    responses(
        (status = 200, description = "Invite accepted", body = ApiResponse<InviteResponseDto>),
        (status = 403, description = "Invite addressed to another user"),
        (status = 404, description = "Invite not found"),
        (status = 409, description = "Invite already answered")
    ),
    security(("bearer_auth" = [])),
    tag = "org-invites"
)]
pub async fn accept_invite(
    user: CurrentUser,
    State(service): State<Arc<InviteService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<InviteResponseDto>>> {
    let invite = service.accept(id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(invite.into()),
        Some("Invitation accepted".to_string()),
        None,
    )))
}

/// Reject an invite
#[utoipa::path(
    post,
    path = "/api/org-invites/reject/{id}",
    params(
        ("id" = Uuid, Path, description = "Invite ID")
    ),
    responses(
        (status = 200, description = "Invite rejected", body = ApiResponse<InviteResponseDto>),
        (status = 403, description = "Invite addressed to another user"),
        (status = 404, description = "Invite not found"),
        (status = 409, description = "Invite already answered")
    ),
    security(("bearer_auth" = [])),
    tag = "org-invites"
)]
pub async fn reject_invite(
    user: CurrentUser,
    State(service): State<Arc<InviteService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<InviteResponseDto>>> {
    let invite = service.reject(id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(invite.into()),
        Some("Invitation rejected".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    use crate::features::org_invites::routes::routes;
    use crate::features::org_invites::services::InviteService;
    use crate::features::organizations::OrganizationService;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    fn server() -> TestServer {
        let pool = lazy_pool();
        let service = Arc::new(InviteService::new(
            pool.clone(),
            Arc::new(UserService::new(pool.clone())),
            Arc::new(OrganizationService::new(pool)),
        ));
        TestServer::new(with_test_user(routes(service))).unwrap()
    }

    #[tokio::test]
    async fn test_send_rejects_unknown_role() {
        let response = server()
            .post("/api/org-invites/send")
            .json(&json!({"invited_user_id": "kc-bob", "role": "admin"}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_pending_for_another_user_is_forbidden() {
        let response = server()
            .get(&format!("/api/org-invites/pending/{}", uuid::Uuid::new_v4()))
            .await;

        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }
}
