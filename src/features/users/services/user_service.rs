use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{CreateUserDto, ListUsersQuery};
use crate::features::users::models::User;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, DEFAULT_USER_ROLE, USER_SEARCH_LIMIT};

const USER_COLUMNS: &str = "id, keycloak_id, username, email, role, created_at, updated_at";

/// Service for local user records
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_keycloak_id(&self, keycloak_id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE keycloak_id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(keycloak_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Resolve a user given either its UUID or its Keycloak subject
    pub async fn find_by_reference(&self, reference: &str) -> Result<User> {
        if let Ok(id) = Uuid::parse_str(reference) {
            let query = format!(
                "SELECT {} FROM users WHERE id = $1 OR keycloak_id = $2",
                USER_COLUMNS
            );
            if let Some(user) = sqlx::query_as::<_, User>(&query)
                .bind(id)
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?
            {
                return Ok(user);
            }
        } else if let Some(user) = self.find_by_keycloak_id(reference).await? {
            return Ok(user);
        }

        Err(AppError::NotFound(format!("User '{}' not found", reference)))
    }

    /// Lookup by Keycloak id, search by username/email, or list the first page
    pub async fn list(&self, filter: &ListUsersQuery) -> Result<Vec<User>> {
        if let Some(keycloak_id) = filter.keycloak_id.as_deref() {
            return Ok(self.find_by_keycloak_id(keycloak_id).await?.into_iter().collect());
        }

        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if search.is_empty() {
                return Ok(Vec::new());
            }
            let query = format!(
                r#"
                SELECT {}
                FROM users
                WHERE username ILIKE $1 ESCAPE '\' OR email ILIKE $1 ESCAPE '\'
                ORDER BY username
                LIMIT $2
                "#,
                USER_COLUMNS
            );
            let users = sqlx::query_as::<_, User>(&query)
                .bind(like_pattern(search))
                .bind(USER_SEARCH_LIMIT)
                .fetch_all(&self.pool)
                .await?;
            return Ok(users);
        }

        let query = format!(
            "SELECT {} FROM users ORDER BY username LIMIT $1",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&query)
            .bind(DEFAULT_PAGE_SIZE)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn create(&self, dto: CreateUserDto) -> Result<User> {
        let query = format!(
            r#"
            INSERT INTO users (keycloak_id, username, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&dto.keycloak_id)
            .bind(&dto.username)
            .bind(dto.email.as_deref().unwrap_or(""))
            .bind(dto.role.as_deref().unwrap_or(DEFAULT_USER_ROLE))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(e, "A user with this keycloak_id or username already exists")
            })?;

        tracing::info!(
            "User created: id={}, username={}",
            user.id,
            user.username
        );
        Ok(user)
    }

    /// Get the record bound to the token's subject, creating it on first use.
    ///
    /// Usernames are unique locally; when the token's preferred username is
    /// taken by another subject, a suffix derived from the subject is added.
    pub async fn resolve(&self, identity: &AuthenticatedUser) -> Result<User> {
        if let Some(user) = self.find_by_keycloak_id(&identity.sub).await? {
            return self.refresh_email(user, identity).await;
        }

        let base_username = identity
            .preferred_username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let email = identity.email.clone().unwrap_or_default();

        for username in [base_username.clone(), fallback_username(&base_username, &identity.sub)] {
            match self.insert_if_absent(&identity.sub, &username, &email).await {
                Ok(Some(user)) => {
                    tracing::info!(
                        "Provisioned user from identity provider: id={}, username={}",
                        user.id,
                        user.username
                    );
                    return Ok(user);
                }
                // Another request provisioned the same subject concurrently
                Ok(None) => {
                    return self
                        .find_by_keycloak_id(&identity.sub)
                        .await?
                        .ok_or_else(|| AppError::Internal("User vanished after insert".into()));
                }
                Err(e) if is_username_conflict(&e) => {
                    tracing::debug!("Username '{}' taken, trying fallback", username);
                    continue;
                }
                Err(e) => return Err(AppError::Database(e)),
            }
        }

        Err(AppError::Conflict(format!(
            "Could not allocate a unique username for '{}'",
            base_username
        )))
    }

    async fn insert_if_absent(
        &self,
        keycloak_id: &str,
        username: &str,
        email: &str,
    ) -> std::result::Result<Option<User>, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (keycloak_id, username, email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (keycloak_id) DO NOTHING
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(keycloak_id)
            .bind(username)
            .bind(email)
            .bind(DEFAULT_USER_ROLE)
            .fetch_optional(&self.pool)
            .await
    }

    /// Keep the stored email in sync with the token
    async fn refresh_email(&self, user: User, identity: &AuthenticatedUser) -> Result<User> {
        let Some(email) = identity.email.as_deref() else {
            return Ok(user);
        };
        if email == user.email {
            return Ok(user);
        }

        let query = format!(
            "UPDATE users SET email = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        let updated = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!("Updated email for user {}", updated.id);
        Ok(updated)
    }
}

fn is_username_conflict(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some("users_username_key")
        }
        _ => false,
    }
}

/// `alice` + subject `3f1c9a7e-...` becomes `alice-3f1c9a7e`
fn fallback_username(base: &str, sub: &str) -> String {
    let suffix: String = sub.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect();
    format!("{}-{}", base, suffix)
}

/// Build an ILIKE pattern matching `search` as a literal substring
pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_fallback_username_uses_subject_prefix() {
        assert_eq!(
            fallback_username("alice", "3f1c9a7e-0b2d-4c61-9e8f-1234567890ab"),
            "alice-3f1c9a7e"
        );
    }
}
