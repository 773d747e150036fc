use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Capabilities advertised on the root endpoint
pub const FEATURES: [&str; 5] = [
    "Real-time Comments",
    "Annotations",
    "Media Sharing",
    "Organizations",
    "WebSocket",
];

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfoDto {
    pub message: String,
    pub status: String,
    pub features: Vec<String>,
}

impl Default for ServiceInfoDto {
    fn default() -> Self {
        Self {
            message: "FrameSync API Server".to_string(),
            status: "Running".to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostgresStatusDto {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RealtimeStatusDto {
    /// Media rooms with at least one member
    pub rooms: usize,
    /// Open WebSocket connections
    pub connections: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DbHealthDto {
    pub postgresql: PostgresStatusDto,
    pub realtime: RealtimeStatusDto,
}
