use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::users::dtos::{CreateUserDto, ListUsersQuery, UserResponseDto};
use crate::features::users::services::UserService;
use crate::features::users::CurrentUser;
use crate::shared::types::ApiResponse;

/// Get the caller's user record
///
/// The record is created on first request from a new Keycloak subject.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(user: CurrentUser) -> Result<Json<ApiResponse<UserResponseDto>>> {
    Ok(Json(ApiResponse::success(Some(user.0.into()), None, None)))
}

/// List users
///
/// With `keycloak_id` returns at most the one matching record; with `search`
/// returns up to 20 users whose username or email contains the term.
#[utoipa::path(
    get,
    path = "/api/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(service): State<Arc<UserService>>,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let users = service.list(&query).await?;
    let dtos: Vec<UserResponseDto> = users.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Create a user record (admin only)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "User already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create(dto).await?;
    tracing::info!("Admin {} created user {}", admin.sub, user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user.into()),
            Some("User created".to_string()),
            None,
        )),
    ))
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(service): State<Arc<UserService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(user.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::features::users::routes::routes;
    use crate::features::users::services::UserService;
    use crate::shared::test_helpers::{lazy_pool, with_test_user};

    fn server() -> TestServer {
        let service = std::sync::Arc::new(UserService::new(lazy_pool()));
        TestServer::new(with_test_user(routes(service))).unwrap()
    }

    #[tokio::test]
    async fn test_get_me_returns_current_user() {
        let response = server().get("/api/me").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["username"], "tester");
        assert_eq!(body["data"]["keycloak_id"], "kc-tester");
    }

    #[tokio::test]
    async fn test_create_user_requires_admin() {
        let response = server()
            .post("/api/users")
            .json(&json!({"keycloak_id": "kc-bob", "username": "bob"}))
            .await;

        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_bad_request() {
        let response = server().get("/api/users/not-a-uuid").await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid path parameter"));
    }
}
