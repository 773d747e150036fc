use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Keycloak realm settings used to validate bearer tokens
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Realm issuer, e.g. `http://localhost:8080/realms/framesync`
    pub issuer: String,
    /// Expected `aud` claim. Keycloak access tokens often carry `account`
    /// only, so the check is skipped when this is not configured.
    pub audience: Option<String>,
    /// Client whose `resource_access` roles are merged into the user's roles
    pub client_id: Option<String>,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Which backend stores uploaded media bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    MinIO,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local: LocalStorageConfig,
    pub minio: MinIOConfig,
}

/// Local filesystem storage, served back under `/uploads`
#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    /// Directory where files are written
    pub upload_dir: String,
    /// Base URL clients use to reach this server (no trailing slash)
    pub public_base_url: String,
}

/// MinIO/S3 storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Public endpoint URL for publicly accessible files (optional, defaults to endpoint)
    pub public_endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix for media objects (e.g., "public")
    pub public_prefix: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_upload_size: usize,
}

#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Messages buffered per room before slow receivers start lagging
    pub room_channel_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let storage = StorageConfig::from_env(&app)?;

        Ok(Config {
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            upload: UploadConfig::from_env()?,
            realtime: RealtimeConfig::from_env()?,
            storage,
            app,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_or("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_or("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_or("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("KEYCLOAK_ISSUER")
            .map_err(|_| "KEYCLOAK_ISSUER environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let audience = env::var("KEYCLOAK_AUDIENCE").ok().filter(|s| !s.is_empty());
        let client_id = env::var("KEYCLOAK_CLIENT_ID").ok().filter(|s| !s.is_empty());

        let jwks_cache_ttl_secs = parse_or("JWKS_CACHE_TTL", Self::DEFAULT_JWKS_CACHE_TTL_SECS)?;
        let jwt_leeway_secs = parse_or("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            issuer,
            audience,
            client_id,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }

    /// Keycloak publishes realm keys at this path
    pub fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.issuer)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "FrameSync API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Media collaboration API for FrameSync".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    pub fn from_env(app: &AppConfig) -> Result<Self, String> {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageBackend::Local,
            "minio" | "s3" => StorageBackend::MinIO,
            other => return Err(format!("Unsupported STORAGE_BACKEND: {}", other)),
        };

        Ok(Self {
            backend,
            local: LocalStorageConfig::from_env(app),
            minio: MinIOConfig::from_env(),
        })
    }
}

impl LocalStorageConfig {
    pub fn from_env(app: &AppConfig) -> Self {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}", app.server_address()))
            .trim_end_matches('/')
            .to_string();

        Self {
            upload_dir,
            public_base_url,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Self {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        Self {
            endpoint,
            public_endpoint,
            access_key: env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            secret_key: env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string()),
            bucket: env::var("MINIO_BUCKET").unwrap_or_else(|_| "framesync-media".to_string()),
            region: env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            public_prefix: env::var("MINIO_PUBLIC_PREFIX").unwrap_or_else(|_| "public".to_string()),
        }
    }
}

impl UploadConfig {
    pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024; // 50MB

    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            max_upload_size: parse_or("MAX_UPLOAD_SIZE", Self::DEFAULT_MAX_UPLOAD_SIZE)?,
        })
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: Self::DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

impl RealtimeConfig {
    const DEFAULT_ROOM_CHANNEL_CAPACITY: usize = 256;

    pub fn from_env() -> Result<Self, String> {
        let room_channel_capacity =
            parse_or("ROOM_CHANNEL_CAPACITY", Self::DEFAULT_ROOM_CHANNEL_CAPACITY)?;
        if room_channel_capacity == 0 {
            return Err("ROOM_CHANNEL_CAPACITY must be greater than zero".to_string());
        }
        Ok(Self {
            room_channel_capacity,
        })
    }
}

/// Read `key` from the environment, falling back to `default` when unset
fn parse_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        let value: u32 = parse_or("FRAMESYNC_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_jwks_url_uses_keycloak_certs_endpoint() {
        let config = AuthConfig {
            issuer: "http://localhost:8080/realms/framesync".to_string(),
            audience: None,
            client_id: None,
            jwks_cache_ttl: Duration::from_secs(60),
            jwt_leeway: Duration::from_secs(0),
        };
        assert_eq!(
            config.jwks_url(),
            "http://localhost:8080/realms/framesync/protocol/openid-connect/certs"
        );
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert!(swagger.credentials().is_none());

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials().as_deref(), Some("admin:secret"));
    }
}
