//! MinIO/S3-compatible storage client
//!
//! Media objects live under a public prefix with an anonymous-read bucket
//! policy, so the stored URL can be handed straight to video/image players.
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::traits::{MediaStorage, StorageError, StorageResult};
use crate::core::config::MinIOConfig;

type HmacSha256 = Hmac<Sha256>;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
    /// Access key for AWS Signature v4 signing
    access_key: String,
    /// Secret key for AWS Signature v4 signing
    secret_key: String,
    /// Region name for AWS Signature v4 signing
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl MinIOClient {
    /// Create a new MinIO client, creating the bucket and public-read policy if needed
    pub async fn new(config: MinIOConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::ConfigError(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::ConfigError(format!("Failed to create MinIO bucket: {}", e)))?;

        // Path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
            public_prefix: config.public_prefix,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        client.ensure_bucket_exists().await;
        client.set_public_read_policy().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, public_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.public_prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created successfully", self.bucket.name()),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
            }
        }
    }

    /// Allow anonymous `GetObject` on `{bucket}/{public_prefix}/*`
    async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();
        let policy = public_read_policy(&bucket_name, &self.public_prefix);

        match self
            .put_bucket_policy_with_sigv4(&bucket_name, &policy)
            .await
        {
            Ok(()) => info!(
                "Set public read policy for {}/{}/*",
                bucket_name, self.public_prefix
            ),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. \
                You may need to set the policy manually using: \
                mc anonymous set download minio/{}/{}",
                bucket_name, e, bucket_name, self.public_prefix
            ),
        }
    }

    /// Put bucket policy using AWS Signature v4
    async fn put_bucket_policy_with_sigv4(
        &self,
        bucket_name: &str,
        policy: &str,
    ) -> StorageResult<()> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| StorageError::ConfigError(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| StorageError::ConfigError("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let url = format!("{}/{}?policy", self.endpoint, bucket_name);
        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_uri = format!("/{}", bucket_name);
        let canonical_querystring = "policy=";
        let canonical_headers = format!(
            "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
            host_header, payload_hash, amz_date
        );
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";

        let canonical_request = format!(
            "PUT\n{}\n{}\n{}\n{}\n{}",
            canonical_uri, canonical_querystring, canonical_headers, signed_headers, payload_hash
        );

        let algorithm = "AWS4-HMAC-SHA256";
        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            algorithm, amz_date, credential_scope, canonical_request_hash
        );

        let signature =
            sigv4_signature(&self.secret_key, &self.region_name, &date_stamp, &string_to_sign)?;

        let authorization_header = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.access_key, credential_scope, signed_headers, signature
        );

        let response = self
            .http_client
            .put(&url)
            .header("Host", &host_header)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", &authorization_header)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| StorageError::ConfigError(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(StorageError::ConfigError(format!(
                "Failed to set bucket policy: {} - {}",
                status, body
            )))
        }
    }

    /// Object key inside the bucket for a media key
    fn object_key(&self, key: &str) -> String {
        format!("{}/{}", self.public_prefix, key)
    }
}

#[async_trait]
impl MediaStorage for MinIOClient {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String> {
        let object_key = self.object_key(key);
        self.bucket
            .put_object_with_content_type(&object_key, &data, content_type)
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!("Failed to upload file '{}': {}", object_key, e))
            })?;

        debug!(
            "Uploaded file '{}' to bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(self.url_for(key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let object_key = self.object_key(key);
        self.bucket.delete_object(&object_key).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file '{}': {}", object_key, e))
        })?;

        debug!(
            "Deleted file '{}' from bucket '{}'",
            object_key,
            self.bucket.name()
        );
        Ok(())
    }

    fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket.name(),
            self.object_key(key)
        )
    }

    fn backend_name(&self) -> &'static str {
        "minio"
    }
}

fn public_read_policy(bucket_name: &str, public_prefix: &str) -> String {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": {"AWS": "*"},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket_name}/{public_prefix}/*")]
            }
        ]
    })
    .to_string()
}

/// AWS Signature v4 over `string_to_sign`
fn sigv4_signature(
    secret_key: &str,
    region: &str,
    date_stamp: &str,
    string_to_sign: &str,
) -> StorageResult<String> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;

    let signature = hmac_sha256(&k_signing, string_to_sign.as_bytes())?;
    Ok(hex::encode(signature))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> StorageResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StorageError::ConfigError(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_read_policy_scopes_to_prefix() {
        let policy: serde_json::Value =
            serde_json::from_str(&public_read_policy("framesync-media", "public")).unwrap();
        assert_eq!(
            policy["Statement"][0]["Resource"][0],
            "arn:aws:s3:::framesync-media/public/*"
        );
    }

    #[test]
    fn test_sigv4_signature_is_deterministic_hex() {
        let a = sigv4_signature("secret", "us-east-1", "20240101", "payload").unwrap();
        let b = sigv4_signature("secret", "us-east-1", "20240101", "payload").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(
            a,
            sigv4_signature("secret", "eu-west-1", "20240101", "payload").unwrap()
        );
    }
}
