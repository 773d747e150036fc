use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::media::models::MediaPermission;
use crate::features::media::AccessService;
use crate::features::organizations::OrganizationService;
use crate::features::shares::dtos::CreateShareDto;
use crate::features::shares::models::{MediaShare, SharedMedia};

/// Select list for a share row `s` joined with recipient `u` and organization `o`
const SHARE_SELECT: &str = "s.id, s.media_id, s.shared_with, u.username AS shared_with_username, \
     s.shared_by, s.organization_id, o.name AS organization_name, s.permission_level, s.created_at";

const UPSERT_CONFLICT: &str = r#"
    ON CONFLICT (media_id, shared_with) DO UPDATE
    SET permission_level = EXCLUDED.permission_level,
        shared_by = EXCLUDED.shared_by,
        organization_id = EXCLUDED.organization_id
"#;

/// Service for per-user media shares
pub struct ShareService {
    pool: PgPool,
    access: Arc<AccessService>,
    organizations: Arc<OrganizationService>,
}

impl ShareService {
    pub fn new(
        pool: PgPool,
        access: Arc<AccessService>,
        organizations: Arc<OrganizationService>,
    ) -> Self {
        Self {
            pool,
            access,
            organizations,
        }
    }

    /// Media shared with `user_id`; only that user may ask
    pub async fn list_shared_with(&self, user_id: Uuid, caller_id: Uuid) -> Result<Vec<SharedMedia>> {
        if user_id != caller_id {
            return Err(AppError::Forbidden(
                "You can only list media shared with yourself".to_string(),
            ));
        }

        let shared = sqlx::query_as::<_, SharedMedia>(
            r#"
            SELECT m.id, m.title, m.media_type, m.storage_key, m.url, m.original_filename,
                   m.content_type, m.file_size, m.uploaded_by, m.created_at, m.updated_at,
                   s.id AS share_id, s.permission_level, s.organization_id,
                   o.name AS organization_name,
                   owner.username AS owner_username,
                   sharer.username AS shared_by_username,
                   s.created_at AS shared_at
            FROM media_shares s
            JOIN media m ON m.id = s.media_id
            JOIN users owner ON owner.id = m.uploaded_by
            JOIN users sharer ON sharer.id = s.shared_by
            LEFT JOIN organizations o ON o.id = s.organization_id
            WHERE s.shared_with = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shared)
    }

    /// Create or update shares for a media item the caller owns
    pub async fn share(&self, dto: CreateShareDto, caller_id: Uuid) -> Result<Vec<MediaShare>> {
        self.access
            .require(dto.media_id, caller_id, MediaPermission::Owner)
            .await?;

        if let Some(organization_id) = dto.organization_id {
            let organization = self.organizations.get(organization_id).await?;
            if self
                .organizations
                .membership(&organization, caller_id)
                .await?
                .is_none()
            {
                return Err(AppError::Forbidden(
                    "You are not a member of this organization".to_string(),
                ));
            }
        }

        let shares = match (dto.user_id, dto.organization_id) {
            (Some(user_id), _) if user_id == caller_id => {
                return Err(AppError::BadRequest(
                    "You cannot share media with yourself".to_string(),
                ));
            }
            (Some(user_id), organization_id) => {
                let query = format!(
                    r#"
                    WITH s AS (
                        INSERT INTO media_shares (media_id, shared_with, shared_by, organization_id, permission_level)
                        VALUES ($1, $2, $3, $4, $5)
                        {}
                        RETURNING *
                    )
                    SELECT {}
                    FROM s
                    JOIN users u ON u.id = s.shared_with
                    LEFT JOIN organizations o ON o.id = s.organization_id
                    "#,
                    UPSERT_CONFLICT, SHARE_SELECT
                );
                sqlx::query_as::<_, MediaShare>(&query)
                    .bind(dto.media_id)
                    .bind(user_id)
                    .bind(caller_id)
                    .bind(organization_id)
                    .bind(dto.permission_level.as_str())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| map_constraint_error(e, "Share already exists"))?
            }
            (None, Some(organization_id)) => {
                let query = format!(
                    r#"
                    WITH recipients AS (
                        SELECT user_id FROM organization_members WHERE organization_id = $3
                        UNION
                        SELECT owner_id FROM organizations WHERE id = $3
                    ),
                    s AS (
                        INSERT INTO media_shares (media_id, shared_with, shared_by, organization_id, permission_level)
                        SELECT $1, r.user_id, $2, $3, $4
                        FROM recipients r
                        WHERE r.user_id <> $2
                        {}
                        RETURNING *
                    )
                    SELECT {}
                    FROM s
                    JOIN users u ON u.id = s.shared_with
                    LEFT JOIN organizations o ON o.id = s.organization_id
                    ORDER BY u.username
                    "#,
                    UPSERT_CONFLICT, SHARE_SELECT
                );
                sqlx::query_as::<_, MediaShare>(&query)
                    .bind(dto.media_id)
                    .bind(caller_id)
                    .bind(organization_id)
                    .bind(dto.permission_level.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Either user_id or organization_id is required".to_string(),
                ));
            }
        };

        info!(
            "Media {} shared by {} with {} user(s) as {}",
            dto.media_id,
            caller_id,
            shares.len(),
            dto.permission_level
        );
        Ok(shares)
    }

    /// Shares of a media item the caller owns
    pub async fn list_for_media(&self, media_id: Uuid, caller_id: Uuid) -> Result<Vec<MediaShare>> {
        self.access
            .require(media_id, caller_id, MediaPermission::Owner)
            .await?;

        let query = format!(
            r#"
            SELECT {}
            FROM media_shares s
            JOIN users u ON u.id = s.shared_with
            LEFT JOIN organizations o ON o.id = s.organization_id
            WHERE s.media_id = $1
            ORDER BY s.created_at ASC
            "#,
            SHARE_SELECT
        );
        let shares = sqlx::query_as::<_, MediaShare>(&query)
            .bind(media_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(shares)
    }

    /// Revoke a share; only the media owner may
    pub async fn revoke(&self, share_id: Uuid, caller_id: Uuid) -> Result<()> {
        let media_id = sqlx::query_scalar::<_, Uuid>("SELECT media_id FROM media_shares WHERE id = $1")
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Share {} not found", share_id)))?;

        self.access
            .require(media_id, caller_id, MediaPermission::Owner)
            .await?;

        sqlx::query("DELETE FROM media_shares WHERE id = $1")
            .bind(share_id)
            .execute(&self.pool)
            .await?;

        info!("Share revoked: id={}, media={}, by={}", share_id, media_id, caller_id);
        Ok(())
    }
}
