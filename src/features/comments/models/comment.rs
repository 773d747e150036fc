use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Comment row joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub media_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    /// Position on the media timeline in seconds; `None` for general comments
    pub timestamp_secs: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
