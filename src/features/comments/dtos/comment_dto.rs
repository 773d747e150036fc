use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::Comment;
use crate::shared::validation::validate_not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub media_id: Uuid,
    pub user_id: Uuid,
    /// Author's username
    pub username: String,
    pub content: String,
    /// Seconds into the media, if the comment is pinned to the timeline
    pub timestamp: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            media_id: c.media_id,
            user_id: c.user_id,
            username: c.username,
            content: c.content,
            timestamp: c.timestamp_secs,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    pub media_id: Uuid,

    #[validate(
        length(min = 1, max = 2000, message = "content must be 1-2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    #[validate(range(min = 0.0, message = "timestamp must not be negative"))]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[validate(
        length(min = 1, max = 2000, message = "content must be 1-2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteCommentResponseDto {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_comment_validation() {
        let valid: CreateCommentDto = serde_json::from_value(serde_json::json!({
            "media_id": Uuid::new_v4(),
            "content": "Cut here",
            "timestamp": 12.5
        }))
        .unwrap();
        assert!(valid.validate().is_ok());

        let general = CreateCommentDto {
            timestamp: None,
            ..valid.clone()
        };
        assert!(general.validate().is_ok());

        let negative = CreateCommentDto {
            timestamp: Some(-1.0),
            ..valid.clone()
        };
        assert!(negative.validate().is_err());

        let blank = CreateCommentDto {
            content: "  ".into(),
            ..valid.clone()
        };
        assert!(blank.validate().is_err());

        let long = CreateCommentDto {
            content: "a".repeat(2001),
            ..valid
        };
        assert!(long.validate().is_err());
    }
}
