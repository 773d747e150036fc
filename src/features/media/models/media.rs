use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const MEDIA_COLUMNS: &str = "id, title, media_type, storage_key, url, original_filename, \
     content_type, file_size, uploaded_by, created_at, updated_at";

/// Database model for an uploaded media item
#[derive(Debug, Clone, FromRow)]
pub struct Media {
    pub id: Uuid,
    pub title: String,
    pub media_type: String,
    pub storage_key: String,
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of media, derived from the upload's MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// `image/<subtype>` and `video/<subtype>` map to their kind; everything else is rejected
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let (top_level, subtype) = content_type.split_once('/')?;
        if subtype.trim().is_empty() {
            return None;
        }
        match top_level.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn from_db(value: &str) -> Self {
        Self::parse(value).unwrap_or(MediaType::Image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(MediaType::from_content_type("image/png"), Some(MediaType::Image));
        assert_eq!(MediaType::from_content_type("VIDEO/mp4"), Some(MediaType::Video));
        assert_eq!(MediaType::from_content_type("application/pdf"), None);
        assert_eq!(MediaType::from_content_type(""), None);
        assert_eq!(MediaType::from_content_type("image"), None);
        assert_eq!(MediaType::from_content_type("video/"), None);
    }

    #[test]
    fn test_media_type_parse() {
        assert_eq!(MediaType::parse(" Video "), Some(MediaType::Video));
        assert_eq!(MediaType::parse("audio"), None);
    }
}
