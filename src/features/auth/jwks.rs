use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Keycloak also publishes encryption keys (`use: enc`) and may include
/// non-RSA keys, so everything except `kid` is optional here.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    #[serde(rename = "use", default)]
    key_use: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    last_fetched: Instant,
}

pub struct JwksClient {
    jwks_url: String,
    client: reqwest::Client,
    cache: Arc<RwLock<Option<JwksCache>>>,
    cache_ttl: Duration,
}

impl JwksClient {
    pub fn new(jwks_url: &str, cache_ttl: Duration) -> Self {
        Self {
            jwks_url: jwks_url.to_string(),
            client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        // Try to get from cache first
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.last_fetched.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        // Cache miss or expired - fetch new keys
        self.fetch_jwks().await?;

        // Try again from cache
        let cache = self.cache.read().await;
        if let Some(ref cached) = *cache {
            cached
                .keys
                .get(kid)
                .cloned()
                .ok_or(JwksError::KeyNotFound(kid.to_string()))
        } else {
            Err(JwksError::KeyNotFound(kid.to_string()))
        }
    }

    async fn fetch_jwks(&self) -> Result<(), JwksError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| JwksError::FetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::FetchError(format!(
                "Failed to fetch JWKS: HTTP {}",
                response.status()
            )));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| JwksError::ParseError(e.to_string()))?;

        let keys = signing_keys(jwks.keys)?;
        tracing::debug!("Fetched {} signing keys from {}", keys.len(), self.jwks_url);

        let mut cache = self.cache.write().await;
        *cache = Some(JwksCache {
            keys,
            last_fetched: Instant::now(),
        });

        Ok(())
    }
}

/// Keep RSA signature keys, keyed by `kid`
fn signing_keys(jwks: Vec<Jwk>) -> Result<HashMap<String, DecodingKey>, JwksError> {
    let mut keys = HashMap::new();

    for jwk in jwks {
        if jwk.kty != "RSA" || jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            continue;
        };
        let decoding_key = DecodingKey::from_rsa_components(n, e)
            .map_err(|e| JwksError::KeyConversionError(e.to_string()))?;
        keys.insert(jwk.kid, decoding_key);
    }

    Ok(keys)
}

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch JWKS: {0}")]
    FetchError(String),

    #[error("Failed to parse JWKS: {0}")]
    ParseError(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to convert key: {0}")]
    KeyConversionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2048-bit base64url modulus; never used to verify a signature
    const TEST_N: &str = "wVfFXbKLBPGKfbmjSncm75MGygM9N0i-EdecBBi0xhYWvbBQ1kuHPWUBK-0kevKKxOukVnTc7B56JvL2RB8RAeEpvzpyFX6V6R5G74F3AG-HOGTagBFg4nyJmoiLDafAkfduDS6tYBjfThyBK01bbSGTs-7VDhLm0JZYa_4M59vMrjR20JH5gwbWYu2iT-gqG7Di2jGU4-bSAxpqL2zyx_OVkvbniSA0NtAcM6EO-1a4wzSiKO8-4-jdjfBUW3HaGIR_ZGbL-O_SykP3OhCQkmWBadeg0xIVJz0U8jubYelyLzxOfhJtYJJhn_ulm9nK7g-ltsim_XrA-H7-XSSIHw";

    #[test]
    fn test_signing_keys_skips_encryption_and_non_rsa_keys() {
        let response: JwksResponse = serde_json::from_value(serde_json::json!({
            "keys": [
                { "kid": "sig-key", "kty": "RSA", "use": "sig", "alg": "RS256", "n": TEST_N, "e": "AQAB" },
                { "kid": "enc-key", "kty": "RSA", "use": "enc", "alg": "RSA-OAEP", "n": TEST_N, "e": "AQAB" },
                { "kid": "ec-key", "kty": "EC", "use": "sig", "crv": "P-256", "x": "f83O", "y": "x_FE" }
            ]
        }))
        .unwrap();

        let keys = signing_keys(response.keys).unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("sig-key"));
    }

    #[test]
    fn test_signing_keys_accepts_missing_use() {
        let response: JwksResponse = serde_json::from_value(serde_json::json!({
            "keys": [{ "kid": "k1", "kty": "RSA", "n": TEST_N, "e": "AQAB" }]
        }))
        .unwrap();

        assert_eq!(signing_keys(response.keys).unwrap().len(), 1);
    }
}
