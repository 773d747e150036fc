use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::org_invites::models::{InviteStatus, OrganizationInvite};
use crate::shared::types::CollaboratorRole;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteResponseDto {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub invited_user_id: Uuid,
    pub invited_by: Uuid,
    pub invited_by_username: String,
    pub role: CollaboratorRole,
    pub message: String,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<OrganizationInvite> for InviteResponseDto {
    fn from(i: OrganizationInvite) -> Self {
        Self {
            id: i.id,
            organization_id: i.organization_id,
            organization_name: i.organization_name,
            invited_user_id: i.invited_user_id,
            invited_by: i.invited_by,
            invited_by_username: i.invited_by_username,
            role: CollaboratorRole::from_db(&i.role),
            message: i.message,
            status: InviteStatus::from_db(&i.status),
            created_at: i.created_at,
            responded_at: i.responded_at,
        }
    }
}

/// Invite a user into an organization.
///
/// Without `organization_id` the inviter's own organization is used, created
/// on first invite.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendInviteDto {
    /// User ID or Keycloak subject of the invitee
    #[validate(length(min = 1, max = 255, message = "invited_user_id is required"))]
    pub invited_user_id: String,

    pub role: CollaboratorRole,

    #[validate(length(max = 1000, message = "message must be at most 1000 characters"))]
    pub message: Option<String>,

    pub organization_id: Option<Uuid>,
}
