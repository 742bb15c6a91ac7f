//! Storage provider trait for image object storage.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends (local filesystem, Google Cloud Storage).
///
/// Keys are slash-separated relative paths such as
/// `shop/6f1c.../0192....jpg`. Implementations live in `questhub-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "gcs").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store an object, replacing any previous content.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Stream an object's content.
    async fn read(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Produce a time-limited URL that allows anonymous GET of the object.
    async fn signed_url(&self, key: &str, ttl: Duration) -> AppResult<String>;
}
