use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::annotations::models::{Annotation, AnnotationShape};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnnotationResponseDto {
    pub id: Uuid,
    pub media_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    /// Seconds into the media
    pub timestamp: f64,
    pub shape: AnnotationShape,
    pub created_at: DateTime<Utc>,
}

impl From<Annotation> for AnnotationResponseDto {
    fn from(a: Annotation) -> Self {
        Self {
            id: a.id,
            media_id: a.media_id,
            user_id: a.user_id,
            username: a.username,
            timestamp: a.timestamp_secs,
            shape: a.shape.0,
            created_at: a.created_at,
        }
    }
}

fn validate_shape(shape: &AnnotationShape) -> Result<(), ValidationError> {
    shape.check_bounds().map_err(|msg| {
        let mut err = ValidationError::new("shape");
        err.message = Some(msg.into());
        err
    })
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnotationDto {
    pub media_id: Uuid,

    #[validate(range(min = 0.0, message = "timestamp must not be negative"))]
    pub timestamp: f64,

    #[validate(custom(function = "validate_shape"))]
    pub shape: AnnotationShape,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteAnnotationResponseDto {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_annotation_validation() {
        let dto: CreateAnnotationDto = serde_json::from_value(json!({
            "media_id": Uuid::new_v4(),
            "timestamp": 3.25,
            "shape": {"type": "rectangle", "x": 0.1, "y": 0.1, "width": 0.2, "height": 0.2}
        }))
        .unwrap();
        assert!(dto.validate().is_ok());

        let negative = CreateAnnotationDto {
            timestamp: -0.5,
            ..dto.clone()
        };
        assert!(negative.validate().is_err());

        let outside = CreateAnnotationDto {
            shape: AnnotationShape::Circle {
                x: 2.0,
                y: 0.5,
                radius: 0.1,
                color: None,
            },
            ..dto
        };
        assert!(outside.validate().is_err());
    }
}
