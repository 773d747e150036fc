use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::organizations::models::{
    Organization, OrganizationMember, OrganizationRole, OrganizationSummary,
};
use crate::shared::types::CollaboratorRole;
use crate::shared::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationResponseDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    /// Caller's role in the organization
    pub role: OrganizationRole,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizationSummary> for OrganizationResponseDto {
    fn from(o: OrganizationSummary) -> Self {
        Self {
            id: o.id,
            name: o.name,
            owner_id: o.owner_id,
            role: OrganizationRole::from_db(&o.role),
            member_count: o.member_count,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberResponseDto {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: CollaboratorRole,
    pub joined_at: DateTime<Utc>,
}

impl From<OrganizationMember> for MemberResponseDto {
    fn from(m: OrganizationMember) -> Self {
        Self {
            user_id: m.user_id,
            username: m.username,
            email: m.email,
            role: CollaboratorRole::from_db(&m.role),
            joined_at: m.joined_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrganizationDetailResponseDto {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub role: OrganizationRole,
    pub members: Vec<MemberResponseDto>,
    pub created_at: DateTime<Utc>,
}

impl OrganizationDetailResponseDto {
    pub fn new(
        organization: Organization,
        role: OrganizationRole,
        members: Vec<OrganizationMember>,
    ) -> Self {
        Self {
            id: organization.id,
            name: organization.name,
            owner_id: organization.owner_id,
            role,
            members: members.into_iter().map(Into::into).collect(),
            created_at: organization.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationDto {
    #[validate(
        length(min = 1, max = 255, message = "name must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateMemberRoleDto {
    pub role: CollaboratorRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveMemberResponseDto {
    pub removed: bool,
}
