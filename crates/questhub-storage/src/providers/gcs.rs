//! Google Cloud Storage provider over the S3-interoperable XML API.
//!
//! GCS accepts SigV4 requests signed with HMAC interoperability keys, so the
//! AWS S3 SDK drives it with a custom endpoint and path-style addressing.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3Body;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use questhub_core::config::storage::GcsStorageConfig;
use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;
use questhub_core::traits::storage::{ByteStream, StorageProvider};

use crate::manager::validate_key;

/// Storage provider backed by a GCS bucket.
#[derive(Debug, Clone)]
pub struct GcsStorageProvider {
    client: Client,
    bucket: String,
}

impl GcsStorageProvider {
    /// Build a client for the configured bucket.
    ///
    /// Uses the configured HMAC key pair when present, otherwise the default
    /// credential chain (environment, profile, instance metadata).
    pub async fn new(config: &GcsStorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.gcs.bucket is required"));
        }
        info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            "Initializing GCS storage provider"
        );

        let s3_config = if config.access_key.is_empty() {
            let shared = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .endpoint_url(&config.endpoint)
                .load()
                .await;
            aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(true)
                .build()
        } else {
            let credentials = Credentials::new(
                &config.access_key,
                &config.secret_key,
                None,
                None,
                "questhub-config",
            );
            aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(config.region.clone()))
                .endpoint_url(&config.endpoint)
                .credentials_provider(credentials)
                .force_path_style(true)
                .build()
        };

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

/// Wrap an SDK error as a storage error.
fn storage_error(
    context: String,
    e: impl std::error::Error + Send + Sync + 'static,
) -> AppError {
    AppError::with_source(ErrorKind::Storage, context, e)
}

#[async_trait]
impl StorageProvider for GcsStorageProvider {
    fn provider_type(&self) -> &str {
        "gcs"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()> {
        validate_key(key)?;
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(S3Body::from(data))
            .send()
            .await
            .map_err(|e| storage_error(format!("Failed to upload {key}"), e))?;
        debug!(key, bytes = len, "Uploaded object to GCS");
        Ok(())
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        validate_key(key)?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                    AppError::not_found(format!("Object not found: {key}"))
                } else {
                    storage_error(format!("Failed to download {key}"), e)
                }
            })?;

        let stream = ReaderStream::new(output.body.into_async_read());
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        validate_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error(format!("Failed to delete {key}"), e))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        validate_key(key)?;
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(false),
            Err(e) => Err(storage_error(format!("Failed to stat {key}"), e)),
        }
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        validate_key(key)?;
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| AppError::internal(format!("Invalid signed URL lifetime: {e}")))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| storage_error(format!("Failed to sign {key}"), e))?;
        Ok(request.uri().to_string())
    }
}
