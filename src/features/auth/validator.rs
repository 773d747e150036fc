use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::{JwksClient, JwksError};

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: Option<String>,
    client_id: Option<String>,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,

    // Keycloak-specific claims
    #[serde(default)]
    typ: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    realm_access: Option<RoleClaim>,
    #[serde(default)]
    resource_access: HashMap<String, RoleClaim>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct RoleClaim {
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: Option<String>,
        client_id: Option<String>,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            client_id,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| match e {
                JwksError::FetchError(_) | JwksError::ParseError(_) => {
                    AppError::ExternalServiceError(e.to_string())
                }
                other => AppError::Auth(other.to_string()),
            })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        self.to_authenticated_user(token_data.claims)
    }

    fn to_authenticated_user(&self, claims: Claims) -> Result<AuthenticatedUser, AppError> {
        // ID tokens and refresh tokens are also RS256-signed by the realm
        if let Some(typ) = &claims.typ {
            if typ != "Bearer" {
                return Err(AppError::Auth("Token is not an access token".to_string()));
            }
        }

        let mut roles = claims
            .realm_access
            .map(|access| access.roles)
            .unwrap_or_default();

        if let Some(client_id) = &self.client_id {
            if let Some(client_roles) = claims.resource_access.get(client_id) {
                for role in &client_roles.roles {
                    if !roles.contains(role) {
                        roles.push(role.clone());
                    }
                }
            }
        }

        Ok(AuthenticatedUser {
            sub: claims.sub,
            preferred_username: claims.preferred_username,
            email: claims.email,
            name: claims.name,
            roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(client_id: Option<&str>) -> JwtValidator {
        JwtValidator::new(
            Arc::new(JwksClient::new(
                "http://localhost/certs",
                Duration::from_secs(60),
            )),
            "http://localhost:8080/realms/framesync".to_string(),
            None,
            client_id.map(str::to_string),
            Duration::from_secs(0),
        )
    }

    fn claims(value: serde_json::Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_merges_realm_and_client_roles() {
        let claims = claims(serde_json::json!({
            "sub": "f1c2",
            "exp": 1,
            "typ": "Bearer",
            "preferred_username": "alice",
            "email": "alice@example.com",
            "realm_access": { "roles": ["offline_access", "admin"] },
            "resource_access": {
                "framesync-client": { "roles": ["uploader", "admin"] },
                "account": { "roles": ["manage-account"] }
            }
        }));

        let user = validator(Some("framesync-client"))
            .to_authenticated_user(claims)
            .unwrap();

        assert_eq!(user.sub, "f1c2");
        assert_eq!(user.preferred_username.as_deref(), Some("alice"));
        assert_eq!(user.roles, vec!["offline_access", "admin", "uploader"]);
        assert!(user.is_admin());
    }

    #[test]
    fn test_rejects_non_access_tokens() {
        let claims = claims(serde_json::json!({ "sub": "f1c2", "exp": 1, "typ": "ID" }));
        let result = validator(None).to_authenticated_user(claims);
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_missing_role_claims_yield_no_roles() {
        let claims = claims(serde_json::json!({ "sub": "f1c2", "exp": 1 }));
        let user = validator(Some("framesync-client"))
            .to_authenticated_user(claims)
            .unwrap();
        assert!(user.roles.is_empty());
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn test_rejects_malformed_token() {
        let result = validator(None).validate_token("not-a-jwt").await;
        assert!(matches!(result, Err(AppError::Auth(_))));
    }
}
