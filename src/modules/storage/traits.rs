use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend for uploaded media bytes.
///
/// Keys are relative paths such as `media/{user_id}/{file_id}.mp4`; the
/// backend decides where they live and how clients reach them.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `data` under `key` and return the URL clients use to fetch it
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Remove the object stored under `key`. Missing objects are not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Public URL for `key`
    fn url_for(&self, key: &str) -> String;

    fn backend_name(&self) -> &'static str;
}
