use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::media::models::{Media, MediaPermission, MediaType};
use crate::shared::validation::validate_not_blank;

/// Upload media request DTO for OpenAPI documentation.
/// The handler reads the multipart form directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// Image or video file (max 50 MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Display title
    #[schema(example = "Storyboard v2")]
    pub title: String,
    /// "image" or "video"; detected from the file's MIME type when omitted
    #[schema(rename = "type", example = "video")]
    pub media_type: Option<String>,
}

/// Response DTO for a media item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaResponseDto {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Public URL of the stored file
    pub url: String,
    pub original_filename: String,
    pub content_type: String,
    /// Size in bytes
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Media> for MediaResponseDto {
    fn from(m: Media) -> Self {
        Self {
            id: m.id,
            title: m.title,
            media_type: MediaType::from_db(&m.media_type),
            url: m.url,
            original_filename: m.original_filename,
            content_type: m.content_type,
            file_size: m.file_size,
            uploaded_by: m.uploaded_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Media item together with the caller's permission on it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaDetailResponseDto {
    #[serde(flatten)]
    pub media: MediaResponseDto,
    pub permission: MediaPermission,
}

/// Request DTO for renaming a media item
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMediaDto {
    #[validate(
        length(min = 1, max = 255, message = "title must be 1-255 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
}

/// Media type filter for listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaTypeFilter {
    #[default]
    All,
    Image,
    Video,
}

impl MediaTypeFilter {
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            MediaTypeFilter::All => None,
            MediaTypeFilter::Image => Some(MediaType::Image),
            MediaTypeFilter::Video => Some(MediaType::Video),
        }
    }
}

/// Sort order for listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaSort {
    #[default]
    Newest,
    Oldest,
    Alphabetical,
}

impl MediaSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            MediaSort::Newest => "created_at DESC",
            MediaSort::Oldest => "created_at ASC",
            MediaSort::Alphabetical => "LOWER(title) ASC, created_at DESC",
        }
    }
}

/// Query params for listing the caller's media
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListMediaQuery {
    /// `all` (default), `image` or `video`
    #[serde(rename = "type", default)]
    pub media_type: MediaTypeFilter,
    /// `newest` (default), `oldest` or `alphabetical`
    #[serde(default)]
    pub sort: MediaSort,
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponseDto {
    pub deleted: bool,
}

/// Allowed MIME types for media uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-matroska",
];

/// Lowercased MIME type with any parameters stripped
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get the storage file extension for an allowed content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "video/x-matroska" => Some("mkv"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_mime_type_has_an_extension() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(get_extension_from_content_type(mime).is_some(), "{}", mime);
        }
        assert_eq!(get_extension_from_content_type("video/quicktime"), Some("mov"));
        assert_eq!(get_extension_from_content_type("image/x-anything"), None);
    }

    #[test]
    fn test_mime_allow_list() {
        assert!(is_mime_type_allowed(&normalize_content_type("Image/PNG; charset=binary")));
        assert!(!is_mime_type_allowed("image/svg+xml"));
        assert!(!is_mime_type_allowed("image/x-anything"));
        assert!(!is_mime_type_allowed("image"));
        assert!(!is_mime_type_allowed("text/html"));
    }

    #[test]
    fn test_list_query_defaults_and_rename() {
        let query: ListMediaQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.media_type, MediaTypeFilter::All);
        assert_eq!(query.sort, MediaSort::Newest);

        let query: ListMediaQuery =
            serde_json::from_str(r#"{"type":"video","sort":"alphabetical"}"#).unwrap();
        assert_eq!(query.media_type.media_type(), Some(MediaType::Video));
        assert_eq!(query.sort.order_by(), "LOWER(title) ASC, created_at DESC");
    }

    #[test]
    fn test_response_exposes_type_and_hides_storage_key() {
        let media = crate::shared::test_helpers::create_media(Uuid::new_v4());
        let detail = MediaDetailResponseDto {
            media: media.clone().into(),
            permission: MediaPermission::Reviewer,
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["title"], media.title.as_str());
        assert_eq!(json["permission"], "reviewer");
        assert!(json.get("storage_key").is_none());
    }

    #[test]
    fn test_update_media_rejects_blank_title() {
        assert!(UpdateMediaDto { title: "   ".into() }.validate().is_err());
        assert!(UpdateMediaDto { title: "Final cut".into() }.validate().is_ok());
    }
}
