use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::media::models::Media;

/// Share row with the recipient's username and the organization's name
#[derive(Debug, Clone, FromRow)]
pub struct MediaShare {
    pub id: Uuid,
    pub media_id: Uuid,
    pub shared_with: Uuid,
    pub shared_with_username: String,
    pub shared_by: Uuid,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    pub permission_level: String,
    pub created_at: DateTime<Utc>,
}

/// A media item as seen by someone it was shared with
#[derive(Debug, Clone, FromRow)]
pub struct SharedMedia {
    #[sqlx(flatten)]
    pub media: Media,
    pub share_id: Uuid,
    pub permission_level: String,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    pub owner_username: String,
    pub shared_by_username: String,
    pub shared_at: DateTime<Utc>,
}
