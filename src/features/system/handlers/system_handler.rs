use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use sqlx::PgPool;

use crate::core::database;
use crate::core::error::Result;
use crate::features::realtime::RoomHub;
use crate::features::system::dtos::{
    DbHealthDto, PostgresStatusDto, RealtimeStatusDto, ServiceInfoDto,
};

#[derive(Clone)]
pub struct SystemState {
    pub pool: PgPool,
    pub hub: Arc<RoomHub>,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfoDto)
    ),
    tag = "system"
)]
pub async fn service_info() -> Json<ServiceInfoDto> {
    Json(ServiceInfoDto::default())
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up")
    ),
    tag = "system"
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Database round-trip plus realtime counters
#[utoipa::path(
    get,
    path = "/health/db",
    responses(
        (status = 200, description = "Database reachable", body = DbHealthDto),
        (status = 500, description = "Database unreachable")
    ),
    tag = "system"
)]
pub async fn db_health(State(state): State<SystemState>) -> Result<Json<DbHealthDto>> {
    let now = database::server_time(&state.pool).await?;

    Ok(Json(DbHealthDto {
        postgresql: PostgresStatusDto { now },
        realtime: RealtimeStatusDto {
            rooms: state.hub.room_count().await,
            connections: state.hub.connection_count(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::system::routes;
    use crate::shared::test_helpers::lazy_pool;
    use axum_test::TestServer;

    fn server() -> TestServer {
        let state = SystemState {
            pool: lazy_pool(),
            hub: Arc::new(RoomHub::new(8)),
        };
        TestServer::new(routes::routes(state)).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_running() {
        let response = server().get("/").await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "FrameSync API Server");
        assert_eq!(body["status"], "Running");
        assert!(body["features"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "Annotations"));
    }

    #[tokio::test]
    async fn test_health_is_ok_without_database() {
        server().get("/health").await.assert_status_ok();
    }
}
