use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::traits::{MediaStorage, StorageError, StorageResult};

/// Local filesystem storage
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create the storage root if needed.
    ///
    /// * `base_path` - Root directory for file storage (e.g., "uploads")
    /// * `base_url` - URL the root is served under (e.g., "http://localhost:5000/uploads")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %base_path.display(),
            base_url = %base_url,
            "Local media storage ready"
        );

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to a path under the storage root.
    ///
    /// Only plain relative components are accepted, so a key can never
    /// escape `base_path`.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains('\\') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' is not a valid relative path",
                key
            )));
        }

        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' must not contain absolute or parent components",
                key
            )));
        }

        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalStorage {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(key = %key, size_bytes = size, "Stored media on local disk");

        Ok(self.url_for(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %key, "Deleted media from local disk");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(key = %key, "Media file already missing on delete");
                Ok(())
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:5000/uploads/".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let (_dir, storage) = storage().await;

        let url = storage
            .put("media/u1/clip.mp4", b"frames".to_vec(), "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:5000/uploads/media/u1/clip.mp4");
        let written = fs::read(storage.base_path().join("media/u1/clip.mp4"))
            .await
            .unwrap();
        assert_eq!(written, b"frames");
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let (_dir, storage) = storage().await;
        storage
            .put("media/u1/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        storage.delete("media/u1/a.png").await.unwrap();
        assert!(!storage.base_path().join("media/u1/a.png").exists());

        storage.delete("media/u1/a.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (_dir, storage) = storage().await;

        for key in ["../escape.png", "/etc/passwd", "media/../../x", "", "a\\b"] {
            let result = storage.put(key, vec![0], "image/png").await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
        }
    }
}
