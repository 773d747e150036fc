use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::comments::dtos::CreateCommentDto;
use crate::features::comments::models::Comment;
use crate::features::media::models::MediaPermission;
use crate::features::media::AccessService;

/// Columns of a comment row `c` joined with its author `u`
const COMMENT_SELECT: &str = "c.id, c.media_id, c.user_id, u.username, c.content, \
     c.timestamp_secs, c.created_at, c.updated_at";

/// Service for timeline comments
pub struct CommentService {
    pool: PgPool,
    access: Arc<AccessService>,
}

impl CommentService {
    pub fn new(pool: PgPool, access: Arc<AccessService>) -> Self {
        Self { pool, access }
    }

    async fn get(&self, id: Uuid) -> Result<Comment> {
        let query = format!(
            "SELECT {} FROM comments c JOIN users u ON u.id = c.user_id WHERE c.id = $1",
            COMMENT_SELECT
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))
    }

    /// Comments on a media item, timeline comments first in timeline order
    pub async fn list(&self, media_id: Uuid, user_id: Uuid) -> Result<Vec<Comment>> {
        self.access
            .require(media_id, user_id, MediaPermission::Viewer)
            .await?;

        let query = format!(
            r#"
            SELECT {}
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.media_id = $1
            ORDER BY c.timestamp_secs ASC NULLS LAST, c.created_at ASC
            "#,
            COMMENT_SELECT
        );
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(media_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    pub async fn create(&self, dto: CreateCommentDto, user_id: Uuid) -> Result<Comment> {
        self.access
            .require(dto.media_id, user_id, MediaPermission::Reviewer)
            .await?;

        let query = format!(
            r#"
            WITH c AS (
                INSERT INTO comments (media_id, user_id, content, timestamp_secs)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {}
            FROM c
            JOIN users u ON u.id = c.user_id
            "#,
            COMMENT_SELECT
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(dto.media_id)
            .bind(user_id)
            .bind(dto.content.trim())
            .bind(dto.timestamp)
            .fetch_one(&self.pool)
            .await?;

        info!(
            "Comment created: id={}, media={}, user={}",
            comment.id, comment.media_id, user_id
        );
        Ok(comment)
    }

    /// Edit a comment; only its author may
    pub async fn update(&self, id: Uuid, user_id: Uuid, content: &str) -> Result<Comment> {
        let existing = self.get(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden(
                "Only the author can edit this comment".to_string(),
            ));
        }

        let query = format!(
            r#"
            WITH c AS (
                UPDATE comments SET content = $1, updated_at = NOW()
                WHERE id = $2
                RETURNING *
            )
            SELECT {}
            FROM c
            JOIN users u ON u.id = c.user_id
            "#,
            COMMENT_SELECT
        );
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(content.trim())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        info!("Comment updated: id={}", comment.id);
        Ok(comment)
    }

    /// Delete a comment; its author or the media owner may
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let existing = self.get(id).await?;
        if existing.user_id != user_id {
            let media = self.access.get_media(existing.media_id).await?;
            if media.uploaded_by != user_id {
                return Err(AppError::Forbidden(
                    "Only the author or the media owner can delete this comment".to_string(),
                ));
            }
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!("Comment deleted: id={}, by={}", id, user_id);
        Ok(())
    }
}
