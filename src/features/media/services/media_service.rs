use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::media::dtos::{
    get_extension_from_content_type, is_mime_type_allowed, ListMediaQuery,
};
use crate::features::media::models::{Media, MediaPermission, MediaType, MEDIA_COLUMNS};
use crate::features::media::services::AccessService;
use crate::modules::storage::{media_key, MediaStorage};

/// A validated upload ready to be stored
#[derive(Debug)]
pub struct NewMedia {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
    pub title: String,
    pub media_type: MediaType,
}

/// Service for media items and their stored files
pub struct MediaService {
    pool: PgPool,
    storage: Arc<dyn MediaStorage>,
    access: Arc<AccessService>,
}

impl MediaService {
    pub fn new(pool: PgPool, storage: Arc<dyn MediaStorage>, access: Arc<AccessService>) -> Self {
        Self {
            pool,
            storage,
            access,
        }
    }

    /// Decide the media type of an upload.
    ///
    /// The normalized MIME type must be on the allow-list; an explicitly
    /// requested type must agree with it.
    pub fn resolve_media_type(content_type: &str, requested: Option<&str>) -> Result<MediaType> {
        let detected = MediaType::from_content_type(content_type)
            .filter(|_| is_mime_type_allowed(content_type))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "File type '{}' is not allowed. Only image and video files are accepted",
                    content_type
                ))
            })?;

        match requested.map(str::trim).filter(|r| !r.is_empty()) {
            None => Ok(detected),
            Some(raw) => {
                let requested = MediaType::parse(raw).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Invalid media type '{}'. Expected 'image' or 'video'",
                        raw
                    ))
                })?;
                if requested != detected {
                    return Err(AppError::BadRequest(format!(
                        "Media type '{}' does not match file type '{}'",
                        requested.as_str(),
                        content_type
                    )));
                }
                Ok(requested)
            }
        }
    }

    /// Store the file, then record its metadata.
    ///
    /// The stored object is removed again if the row cannot be inserted.
    pub async fn upload(&self, upload: NewMedia, user_id: Uuid) -> Result<Media> {
        let file_size = upload.data.len() as i64;
        let extension = get_extension_from_content_type(&upload.content_type).ok_or_else(|| {
            AppError::BadRequest(format!(
                "File type '{}' is not allowed",
                upload.content_type
            ))
        })?;
        let key = media_key(user_id, Uuid::new_v4(), extension);

        let url = self
            .storage
            .put(&key, upload.data, &upload.content_type)
            .await?;
        debug!("Media stored via {}: {}", self.storage.backend_name(), key);

        let query = format!(
            r#"
            INSERT INTO media (title, media_type, storage_key, url, original_filename, content_type, file_size, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Media>(&query)
            .bind(&upload.title)
            .bind(upload.media_type.as_str())
            .bind(&key)
            .bind(&url)
            .bind(&upload.original_filename)
            .bind(&upload.content_type)
            .bind(file_size)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await;

        let media = match inserted {
            Ok(media) => media,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    warn!("Failed to remove orphaned upload {}: {}", key, cleanup);
                }
                return Err(AppError::Database(e));
            }
        };

        info!(
            "Media uploaded: id={}, type={}, size={}, user={}",
            media.id, media.media_type, media.file_size, user_id
        );
        Ok(media)
    }

    /// Media uploaded by `user_id`
    pub async fn list_own(&self, user_id: Uuid, filter: &ListMediaQuery) -> Result<Vec<Media>> {
        let query = format!(
            r#"
            SELECT {}
            FROM media
            WHERE uploaded_by = $1 AND ($2::TEXT IS NULL OR media_type = $2)
            ORDER BY {}
            "#,
            MEDIA_COLUMNS,
            filter.sort.order_by()
        );
        let media = sqlx::query_as::<_, Media>(&query)
            .bind(user_id)
            .bind(filter.media_type.media_type().map(|t| t.as_str()))
            .fetch_all(&self.pool)
            .await?;
        Ok(media)
    }

    /// Media item with the caller's permission; viewer or better required
    pub async fn get_for(&self, media_id: Uuid, user_id: Uuid) -> Result<(Media, MediaPermission)> {
        self.access
            .require(media_id, user_id, MediaPermission::Viewer)
            .await
    }

    pub async fn rename(&self, media_id: Uuid, user_id: Uuid, title: &str) -> Result<Media> {
        self.access
            .require(media_id, user_id, MediaPermission::Owner)
            .await?;

        let query = format!(
            "UPDATE media SET title = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            MEDIA_COLUMNS
        );
        let media = sqlx::query_as::<_, Media>(&query)
            .bind(title.trim())
            .bind(media_id)
            .fetch_one(&self.pool)
            .await?;

        info!("Media renamed: id={}, title={}", media.id, media.title);
        Ok(media)
    }

    /// Delete the row (comments, annotations and shares cascade) and its file
    pub async fn delete(&self, media_id: Uuid, user_id: Uuid) -> Result<()> {
        let (media, _) = self
            .access
            .require(media_id, user_id, MediaPermission::Owner)
            .await?;

        sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(media.id)
            .execute(&self.pool)
            .await?;

        if let Err(e) = self.storage.delete(&media.storage_key).await {
            warn!(
                "Media row {} deleted but file {} could not be removed: {}",
                media.id, media.storage_key, e
            );
        }

        info!("Media deleted: id={}, user={}", media.id, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_media_type_detects_from_mime() {
        assert_eq!(
            MediaService::resolve_media_type("video/mp4", None).unwrap(),
            MediaType::Video
        );
        assert_eq!(
            MediaService::resolve_media_type("image/png", Some("  ")).unwrap(),
            MediaType::Image
        );
    }

    #[test]
    fn test_resolve_media_type_rejects_mismatch_and_unknown() {
        assert!(matches!(
            MediaService::resolve_media_type("image/png", Some("video")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            MediaService::resolve_media_type("application/pdf", None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            MediaService::resolve_media_type("image/x-anything", None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            MediaService::resolve_media_type("image/svg+xml", None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            MediaService::resolve_media_type("video/webm", Some("audio")),
            Err(AppError::BadRequest(_))
        ));
    }
}
