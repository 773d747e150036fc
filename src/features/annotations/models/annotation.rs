use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::AnnotationShape;

/// Annotation row joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct Annotation {
    pub id: Uuid,
    pub media_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub timestamp_secs: f64,
    pub shape: Json<AnnotationShape>,
    pub created_at: DateTime<Utc>,
}
