use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::media::dtos::MediaResponseDto;
use crate::features::shares::models::{MediaShare, SharedMedia};
use crate::shared::types::CollaboratorRole;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShareResponseDto {
    pub id: Uuid,
    pub media_id: Uuid,
    pub shared_with: Uuid,
    pub shared_with_username: String,
    pub shared_by: Uuid,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    pub permission_level: CollaboratorRole,
    pub created_at: DateTime<Utc>,
}

impl From<MediaShare> for ShareResponseDto {
    fn from(s: MediaShare) -> Self {
        Self {
            id: s.id,
            media_id: s.media_id,
            shared_with: s.shared_with,
            shared_with_username: s.shared_with_username,
            shared_by: s.shared_by,
            organization_id: s.organization_id,
            organization_name: s.organization_name,
            permission_level: CollaboratorRole::from_db(&s.permission_level),
            created_at: s.created_at,
        }
    }
}

/// Media shared with the caller, with who shared it and at which level
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedMediaResponseDto {
    #[serde(flatten)]
    pub media: MediaResponseDto,
    pub share_id: Uuid,
    pub permission_level: CollaboratorRole,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    /// Uploader's username
    pub owner_username: String,
    pub shared_by_username: String,
    pub shared_at: DateTime<Utc>,
}

impl From<SharedMedia> for SharedMediaResponseDto {
    fn from(s: SharedMedia) -> Self {
        Self {
            media: s.media.into(),
            share_id: s.share_id,
            permission_level: CollaboratorRole::from_db(&s.permission_level),
            organization_id: s.organization_id,
            organization_name: s.organization_name,
            owner_username: s.owner_username,
            shared_by_username: s.shared_by_username,
            shared_at: s.shared_at,
        }
    }
}

/// Share a media item with one user, or with every member of an organization.
///
/// With `user_id` the share targets that user (and records `organization_id`
/// if given). With only `organization_id` every member and the owner of that
/// organization receives a share.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateShareDto {
    pub media_id: Uuid,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub permission_level: CollaboratorRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteShareResponseDto {
    pub deleted: bool,
}
