//! # questhub-storage
//!
//! Image storage for QuestHub. Uploads are normalised by
//! [`processing::ImageProcessor`] and written through a
//! [`StorageProvider`](questhub_core::traits::storage::StorageProvider):
//! the local filesystem (with HMAC-signed download URLs) or Google Cloud
//! Storage (with V4 presigned URLs).

pub mod manager;
pub mod processing;
pub mod providers;
pub mod signing;

pub use manager::{StorageManager, StoredImage};
