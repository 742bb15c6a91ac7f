//! Storage manager: owns the configured provider and the upload pipeline.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use questhub_core::config::storage::StorageConfig;
use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;
use questhub_core::traits::storage::{ByteStream, StorageProvider};

use crate::processing::ImageProcessor;
use crate::signing::UrlSigner;

/// Result of storing an upload.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Storage key.
    pub key: String,
    /// MIME type of the stored bytes.
    pub content_type: String,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Reject keys that could escape the storage root or address odd objects.
///
/// Keys are relative, slash-separated, and use only ASCII letters, digits,
/// `-`, `_` and `.` in each segment.
pub fn validate_key(key: &str) -> AppResult<()> {
    let invalid = || AppError::validation(format!("Invalid storage key: '{key}'"));
    if key.is_empty() || key.len() > 512 {
        return Err(invalid());
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(invalid());
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Central storage manager shared by the services and the API.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
    processor: ImageProcessor,
    signed_url_ttl: Duration,
    signer: UrlSigner,
}

impl StorageManager {
    /// Build the configured provider.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let signer = UrlSigner::new(&config.signing_secret, &config.public_base_url);
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            #[cfg(feature = "local")]
            "local" => {
                info!(root = %config.data_root, "Initializing local storage provider");
                Arc::new(
                    crate::providers::local::LocalStorageProvider::new(
                        &config.data_root,
                        signer.clone(),
                    )
                    .await?,
                )
            }
            #[cfg(feature = "gcs")]
            "gcs" => Arc::new(crate::providers::gcs::GcsStorageProvider::new(&config.gcs).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local, gcs"
                )));
            }
        };
        Ok(Self::new(provider, config, signer))
    }

    /// Wrap an existing provider.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        config: &StorageConfig,
        signer: UrlSigner,
    ) -> Self {
        Self {
            provider,
            processor: ImageProcessor::from_config(config),
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_seconds),
            signer,
        }
    }

    /// Provider name (`local` or `gcs`).
    pub fn provider_type(&self) -> &str {
        self.provider.provider_type()
    }

    /// Signer for locally served media URLs.
    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// Largest accepted upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.processor.max_bytes()
    }

    /// Normalise an image and store it under `{prefix}/{owner}/{id}.{ext}`.
    pub async fn store_image(
        &self,
        prefix: &str,
        owner: Uuid,
        data: Bytes,
    ) -> AppResult<StoredImage> {
        let processor = self.processor;
        let processed = tokio::task::spawn_blocking(move || processor.process(&data))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Image task panicked", e))??;

        let key = format!("{prefix}/{owner}/{}.{}", Uuid::now_v7(), processed.extension);
        let size_bytes = processed.data.len() as u64;
        self.provider
            .put(&key, processed.data, processed.content_type)
            .await?;

        tracing::debug!(key = %key, size_bytes, "Stored image");
        Ok(StoredImage {
            key,
            content_type: processed.content_type.to_string(),
            size_bytes,
            width: processed.width,
            height: processed.height,
        })
    }

    /// Time-limited download URL for a key.
    pub async fn signed_url(&self, key: &str) -> AppResult<String> {
        self.provider.signed_url(key, self.signed_url_ttl).await
    }

    /// Signed URLs for several keys, in order.
    pub async fn signed_urls(&self, keys: &[String]) -> AppResult<Vec<String>> {
        let mut urls = Vec::with_capacity(keys.len());
        for key in keys {
            urls.push(self.signed_url(key).await?);
        }
        Ok(urls)
    }

    /// Stream an object.
    pub async fn read(&self, key: &str) -> AppResult<ByteStream> {
        self.provider.read(key).await
    }

    /// Whether an object exists.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        self.provider.exists(key).await
    }

    /// Delete an object.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.provider.delete(key).await
    }

    /// Provider reachability.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("shop/0192f0a0-0000-7000-8000-000000000000/a.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/abs/path.jpg").is_err());
        assert!(validate_key("shop/../etc/passwd").is_err());
        assert!(validate_key("shop//a.jpg").is_err());
        assert!(validate_key("shop/a b.jpg").is_err());
        assert!(validate_key("shop\\a.jpg").is_err());
    }

    #[cfg(feature = "local")]
    #[tokio::test]
    async fn test_store_image_roundtrip_on_local_provider() {
        use futures::StreamExt;
        use image::{DynamicImage, ImageFormat, RgbImage};

        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_root: dir.path().to_str().unwrap().to_string(),
            ..StorageConfig::default()
        };
        let storage = StorageManager::from_config(&config).await.unwrap();

        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let owner = Uuid::now_v7();
        let stored = storage
            .store_image("shop", owner, Bytes::from(png))
            .await
            .unwrap();
        assert!(stored.key.starts_with(&format!("shop/{owner}/")));
        assert!(stored.key.ends_with(".png"));
        assert!(storage.exists(&stored.key).await.unwrap());

        let mut stream = storage.read(&stored.key).await.unwrap();
        let mut len = 0;
        while let Some(chunk) = stream.next().await {
            len += chunk.unwrap().len() as u64;
        }
        assert_eq!(len, stored.size_bytes);

        let url = storage.signed_url(&stored.key).await.unwrap();
        assert!(url.contains("signature="));
    }
}
