use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::annotations::dtos::CreateAnnotationDto;
use crate::features::annotations::models::Annotation;
use crate::features::media::models::MediaPermission;
use crate::features::media::AccessService;

const ANNOTATION_SELECT: &str =
    "a.id, a.media_id, a.user_id, u.username, a.timestamp_secs, a.shape, a.created_at";

/// Service for timeline annotations
pub struct AnnotationService {
    pool: PgPool,
    access: Arc<AccessService>,
}

impl AnnotationService {
    pub fn new(pool: PgPool, access: Arc<AccessService>) -> Self {
        Self { pool, access }
    }

    pub async fn list(&self, media_id: Uuid, user_id: Uuid) -> Result<Vec<Annotation>> {
        self.access
            .require(media_id, user_id, MediaPermission::Viewer)
            .await?;

        let query = format!(
            r#"
            SELECT {}
            FROM annotations a
            JOIN users u ON u.id = a.user_id
            WHERE a.media_id = $1
            ORDER BY a.timestamp_secs ASC, a.created_at ASC
            "#,
            ANNOTATION_SELECT
        );
        let annotations = sqlx::query_as::<_, Annotation>(&query)
            .bind(media_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(annotations)
    }

    pub async fn create(&self, dto: CreateAnnotationDto, user_id: Uuid) -> Result<Annotation> {
        self.access
            .require(dto.media_id, user_id, MediaPermission::Reviewer)
            .await?;

        let query = format!(
            r#"
            WITH a AS (
                INSERT INTO annotations (media_id, user_id, timestamp_secs, shape)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {}
            FROM a
            JOIN users u ON u.id = a.user_id
            "#,
            ANNOTATION_SELECT
        );
        let annotation = sqlx::query_as::<_, Annotation>(&query)
            .bind(dto.media_id)
            .bind(user_id)
            .bind(dto.timestamp)
            .bind(Json(&dto.shape))
            .fetch_one(&self.pool)
            .await?;

        info!(
            "Annotation created: id={}, media={}, user={}",
            annotation.id, annotation.media_id, user_id
        );
        Ok(annotation)
    }

    /// Delete an annotation; its author or the media owner may
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let row = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, media_id FROM annotations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let (author_id, media_id) =
            row.ok_or_else(|| AppError::NotFound(format!("Annotation {} not found", id)))?;

        if author_id != user_id {
            let media = self.access.get_media(media_id).await?;
            if media.uploaded_by != user_id {
                return Err(AppError::Forbidden(
                    "Only the author or the media owner can delete this annotation".to_string(),
                ));
            }
        }

        sqlx::query("DELETE FROM annotations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Annotation deleted: id={}, by={}", id, user_id);
        Ok(())
    }
}
