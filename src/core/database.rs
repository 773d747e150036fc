use crate::core::config::DatabaseConfig;
use crate::core::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Round-trip to Postgres and return its clock
pub async fn server_time(pool: &PgPool) -> Result<DateTime<Utc>, sqlx::Error> {
    sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
        .fetch_one(pool)
        .await
}

/// Map constraint violations to client-facing errors.
///
/// `conflict_message` is used for unique violations (23505); foreign-key
/// violations (23503) mean a referenced row does not exist.
pub fn map_constraint_error(e: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            Some("23505") => return AppError::Conflict(conflict_message.to_string()),
            Some("23503") => {
                return AppError::BadRequest("Referenced record does not exist".to_string())
            }
            _ => {}
        }
    }
    AppError::Database(e)
}
