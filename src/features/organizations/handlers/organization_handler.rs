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
use crate::features::organizations::dtos::{
    CreateOrganizationDto, MemberResponseDto, OrganizationDetailResponseDto,
    OrganizationResponseDto, RemoveMemberResponseDto, UpdateMemberRoleDto,
};
use crate::features::organizations::models::OrganizationSummary;
use crate::features::organizations::services::OrganizationService;
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

/// List organizations the caller owns or belongs to
#[utoipa::path(
    get,
    path = "/api/organizations",
    responses(
        (status = 200, description = "Caller's organizations", body = ApiResponse<Vec<OrganizationResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn list_organizations(
    user: CurrentUser,
    State(service): State<Arc<OrganizationService>>,
) -> Result<Json<ApiResponse<Vec<OrganizationResponseDto>>>> {
    let organizations = service.list_for_user(user.id()).await?;
    let dtos: Vec<OrganizationResponseDto> = organizations.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Create an organization owned by the caller
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationDto,
    responses(
        (status = 201, description = "Organization created", body = ApiResponse<OrganizationResponseDto>),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn create_organization(
    user: CurrentUser,
    State(service): State<Arc<OrganizationService>>,
    AppJson(dto): AppJson<CreateOrganizationDto>,
) -> Result<(StatusCode, Json<ApiResponse<OrganizationResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let organization = service.create(&dto.name, user.id()).await?;
    let dto: OrganizationResponseDto = OrganizationSummary {
        id: organization.id,
        name: organization.name,
        owner_id: organization.owner_id,
        role: "owner".to_string(),
        member_count: 0,
        created_at: organization.created_at,
    }
    .into();

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(dto), None, None)),
    ))
}

/// Get an organization with its members
#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID")
    ),
    responses(
        (status = 200, description = "Organization found", body = ApiResponse<OrganizationDetailResponseDto>),
        (status = 403, description = "Not a member"),
        (status = 404, description = "Organization not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn get_organization(
    user: CurrentUser,
    State(service): State<Arc<OrganizationService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<OrganizationDetailResponseDto>>> {
    let (organization, role, members) = service.get_detail(id, user.id()).await?;
    let dto = OrganizationDetailResponseDto::new(organization, role, members);
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

/// Change a member's role (owner only)
#[utoipa::path(
    patch,
    path = "/api/organizations/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    request_body = UpdateMemberRoleDto,
    responses(
        (status = 200, description = "Role updated", body = ApiResponse<MemberResponseDto>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Organization or member not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn update_member_role(
    user: CurrentUser,
    State(service): State<Arc<OrganizationService>>,
    AppPath((id, member_id)): AppPath<(Uuid, Uuid)>,
    AppJson(dto): AppJson<UpdateMemberRoleDto>,
) -> Result<Json<ApiResponse<MemberResponseDto>>> {
    let member = service
        .update_member_role(id, member_id, dto.role, user.id())
        .await?;
    Ok(Json(ApiResponse::success(Some(member.into()), None, None)))
}

/// Remove a member, or leave the organization
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = ApiResponse<RemoveMemberResponseDto>),
        (status = 400, description = "Cannot remove the owner"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Organization or member not found")
    ),
    security(("bearer_auth" = [])),
    tag = "organizations"
)]
pub async fn remove_member(
    user: CurrentUser,
    State(service): State<Arc<OrganizationService>>,
    AppPath((id, member_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<RemoveMemberResponseDto>>> {
    service.remove_member(id, member_id, user.id()).await?;
    Ok(Json(ApiResponse::success(
        Some(RemoveMemberResponseDto { removed: true }),
        None,
        None,
    )))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::Arc;

    use crate::features::organizations::routes::routes;
    use crate::features::organizations::services::OrganizationService;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    fn server() -> TestServer {
        let service = Arc::new(OrganizationService::new(lazy_pool()));
        TestServer::new(with_test_user(routes(service))).unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let response = server()
            .post("/api/organizations")
            .json(&json!({"name": "   "}))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_update_member_role_rejects_owner_role() {
        let response = server()
            .patch(&format!(
                "/api/organizations/{}/members/{}",
                uuid::Uuid::new_v4(),
                uuid::Uuid::new_v4()
            ))
            .json(&json!({"role": "owner"}))
            .await;

        response.assert_status_bad_request();
    }
}
