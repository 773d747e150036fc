use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::shared::validation::USERNAME_REGEX;

/// Response DTO for a user record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    /// Keycloak subject this record is bound to
    pub keycloak_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a user record
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 255, message = "keycloak_id is required"))]
    pub keycloak_id: String,

    #[validate(regex(path = *USERNAME_REGEX, message = "Invalid username"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 50, message = "role must be 1-50 characters"))]
    pub role: Option<String>,
}

/// Query params for listing users
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Exact match on the Keycloak subject
    pub keycloak_id: Option<String>,
    /// Case-insensitive substring match on username or email
    pub search: Option<String>,
}
