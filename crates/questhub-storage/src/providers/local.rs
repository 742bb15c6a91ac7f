//! Local filesystem storage provider.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;
use questhub_core::traits::storage::{ByteStream, StorageProvider};

use crate::manager::validate_key;
use crate::signing::UrlSigner;

/// Local filesystem storage provider.
///
/// Objects live at `root/<key>`; signed URLs point back at this API's media
/// route and are checked with the same [`UrlSigner`].
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
    /// Signer for download URLs.
    signer: UrlSigner,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: &str, signer: UrlSigner) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, signer })
    }

    /// The signer used for this provider's URLs.
    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// Resolve a key to a path within the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        self.ensure_parent(&full_path).await?;

        // Write beside the target and rename so readers never see a partial object.
        let tmp_path = full_path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write object: {key}"), e)
        })?;
        fs::rename(&tmp_path, &full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to commit object: {key}"), e)
        })?;

        debug!(key, bytes = data.len(), "Stored object");
        Ok(())
    }

    async fn read(&self, key: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(key)?;
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Object not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to open object: {key}"),
                    e,
                )
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(Bytes::from))))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {key}"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_path = self.resolve(key)?;
        Ok(fs::try_exists(&full_path).await.unwrap_or(false))
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String> {
        validate_key(key)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::internal(format!("Invalid signed URL lifetime: {e}")))?;
        self.signer.sign(key, Utc::now() + ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider(dir: &tempfile::TempDir) -> LocalStorageProvider {
        LocalStorageProvider::new(
            dir.path().to_str().unwrap(),
            UrlSigner::new("local-test-secret", "http://localhost:8080"),
        )
        .await
        .unwrap()
    }

    async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_put_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir).await;

        provider
            .put("shop/owner/a.jpg", Bytes::from("jpeg bytes"), "image/jpeg")
            .await
            .unwrap();
        assert!(provider.exists("shop/owner/a.jpg").await.unwrap());

        let data = collect(provider.read("shop/owner/a.jpg").await.unwrap()).await;
        assert_eq!(data, b"jpeg bytes");

        provider.delete("shop/owner/a.jpg").await.unwrap();
        assert!(!provider.exists("shop/owner/a.jpg").await.unwrap());
        // Deleting again is fine.
        provider.delete("shop/owner/a.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir).await;
        let err = provider.read("quest/missing.png").await.err().unwrap();
        assert_eq!(err.kind, questhub_core::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir).await;
        assert!(
            provider
                .put("../escape.jpg", Bytes::from("x"), "image/jpeg")
                .await
                .is_err()
        );
        assert!(provider.read("/etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn test_signed_url_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(&dir).await;
        let url = provider
            .signed_url("quest/q1/img.png", Duration::from_secs(60))
            .await
            .unwrap();

        let query = url.split_once('?').unwrap().1;
        let mut expires = 0i64;
        let mut signature = String::new();
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("signature", v) => signature = v.to_string(),
                _ => {}
            }
        }
        assert!(
            provider
                .signer()
                .verify("quest/q1/img.png", expires, &signature, Utc::now())
                .is_ok()
        );
    }
}
