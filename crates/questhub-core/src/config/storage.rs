//! Image storage configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider: `"local"` or `"gcs"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the local provider.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Largest accepted image upload in bytes.
    #[serde(default = "default_max_image")]
    pub max_image_size_bytes: u64,
    /// Longest edge, in pixels, kept after normalisation.
    #[serde(default = "default_max_dimension")]
    pub max_image_dimension: u32,
    /// JPEG quality used when re-encoding photos.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Lifetime of signed URLs in seconds.
    #[serde(default = "default_signed_ttl")]
    pub signed_url_ttl_seconds: u64,
    /// HMAC secret for local signed URLs.
    #[serde(default = "default_signing_secret")]
    pub signing_secret: String,
    /// Externally reachable base URL of this API, used to build local
    /// signed URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Google Cloud Storage settings.
    #[serde(default)]
    pub gcs: GcsStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            data_root: default_data_root(),
            max_image_size_bytes: default_max_image(),
            max_image_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            signed_url_ttl_seconds: default_signed_ttl(),
            signing_secret: default_signing_secret(),
            public_base_url: default_public_base_url(),
            gcs: GcsStorageConfig::default(),
        }
    }
}

/// Google Cloud Storage accessed through its S3-interoperable XML API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcsStorageConfig {
    /// Bucket name.
    #[serde(default)]
    pub bucket: String,
    /// XML API endpoint.
    #[serde(default = "default_gcs_endpoint")]
    pub endpoint: String,
    /// Region string used for request signing.
    #[serde(default = "default_gcs_region")]
    pub region: String,
    /// HMAC access key. Empty means the default AWS credential chain.
    #[serde(default)]
    pub access_key: String,
    /// HMAC secret.
    #[serde(default)]
    pub secret_key: String,
}

impl Default for GcsStorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: default_gcs_endpoint(),
            region: default_gcs_region(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_data_root() -> String {
    "./data/media".to_string()
}

fn default_max_image() -> u64 {
    10 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    2048
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_signed_ttl() -> u64 {
    3600
}

fn default_signing_secret() -> String {
    "CHANGE_ME_MEDIA_SIGNING_SECRET".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}

fn default_gcs_region() -> String {
    "auto".to_string()
}
