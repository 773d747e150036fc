use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::media::models::{Media, MediaPermission, MEDIA_COLUMNS};
use crate::shared::types::CollaboratorRole;

/// Resolves a user's effective permission on a media item.
///
/// The uploader is the owner; anyone else gets the level of their share, if
/// any. Shared by the media, comments, annotations, shares and realtime
/// features.
pub struct AccessService {
    pool: PgPool,
}

impl AccessService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_media(&self, media_id: Uuid) -> Result<Media> {
        let query = format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLUMNS);
        sqlx::query_as::<_, Media>(&query)
            .bind(media_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", media_id)))
    }

    pub async fn permission_for(&self, media: &Media, user_id: Uuid) -> Result<Option<MediaPermission>> {
        if media.uploaded_by == user_id {
            return Ok(Some(MediaPermission::Owner));
        }

        let level = sqlx::query_scalar::<_, String>(
            "SELECT permission_level FROM media_shares WHERE media_id = $1 AND shared_with = $2",
        )
        .bind(media.id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level.map(|l| CollaboratorRole::from_db(&l).into()))
    }

    /// Load a media item and require at least `required` permission on it
    pub async fn require(
        &self,
        media_id: Uuid,
        user_id: Uuid,
        required: MediaPermission,
    ) -> Result<(Media, MediaPermission)> {
        let media = self.get_media(media_id).await?;
        let permission = check_permission(self.permission_for(&media, user_id).await?, required)?;
        Ok((media, permission))
    }
}

pub fn check_permission(
    actual: Option<MediaPermission>,
    required: MediaPermission,
) -> Result<MediaPermission> {
    match actual {
        None => Err(AppError::Forbidden(
            "You do not have access to this media".to_string(),
        )),
        Some(p) if p < required => Err(AppError::Forbidden(format!(
            "{} permission required",
            required
        ))),
        Some(p) => Ok(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_media, lazy_pool};

    #[tokio::test]
    async fn test_uploader_is_owner_without_share_lookup() {
        let owner = Uuid::new_v4();
        let media = create_media(owner);
        let access = AccessService::new(lazy_pool());

        let permission = access.permission_for(&media, owner).await.unwrap();
        assert_eq!(permission, Some(MediaPermission::Owner));
    }

    #[test]
    fn test_check_permission() {
        assert!(matches!(
            check_permission(None, MediaPermission::Viewer),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_permission(Some(MediaPermission::Viewer), MediaPermission::Reviewer),
            Err(AppError::Forbidden(msg)) if msg == "reviewer permission required"
        ));
        assert_eq!(
            check_permission(Some(MediaPermission::Owner), MediaPermission::Reviewer).unwrap(),
            MediaPermission::Owner
        );
        assert_eq!(
            check_permission(Some(MediaPermission::Viewer), MediaPermission::Viewer).unwrap(),
            MediaPermission::Viewer
        );
    }
}
