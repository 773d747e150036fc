//! Storage module for uploaded media
//!
//! Media bytes go to either the local filesystem (served back under
//! `/uploads`) or a MinIO/S3-compatible bucket. Both implement
//! [`MediaStorage`].

mod local;
mod minio_client;
mod traits;

use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::{StorageBackend, StorageConfig};

pub use local::LocalStorage;
pub use minio_client::MinIOClient;
pub use traits::{MediaStorage, StorageError, StorageResult};

/// URL path under which the local backend's files are served
pub const LOCAL_SERVE_PATH: &str = "/uploads";

/// Build the storage key for a media upload: `media/{user_id}/{file_id}.{ext}`
pub fn media_key(user_id: Uuid, file_id: Uuid, extension: &str) -> String {
    format!("media/{}/{}.{}", user_id, file_id, extension)
}

/// Construct the configured storage backend
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn MediaStorage>> {
    match config.backend {
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                &config.local.upload_dir,
                format!("{}{}", config.local.public_base_url, LOCAL_SERVE_PATH),
            )
            .await?;
            Ok(Arc::new(storage))
        }
        StorageBackend::MinIO => {
            let client = MinIOClient::new(config.minio.clone()).await?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_key_layout() {
        let user_id = Uuid::nil();
        let file_id = Uuid::nil();
        assert_eq!(
            media_key(user_id, file_id, "mp4"),
            format!("media/{}/{}.mp4", Uuid::nil(), Uuid::nil())
        );
    }
}
