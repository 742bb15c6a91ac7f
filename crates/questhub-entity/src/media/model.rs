//! Media object model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::macros::db_enum_strings;

/// What an uploaded image is for; also the first segment of its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_purpose", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaPurpose {
    /// Shop photos.
    Shop,
    /// Quest artwork.
    Quest,
    /// Attraction photos.
    Attraction,
    /// Rider documents.
    Rider,
    /// Profile pictures.
    Avatar,
    /// Quest submission proof.
    Submission,
}

db_enum_strings!(MediaPurpose, "media purpose", {
    Shop => "shop",
    Quest => "quest",
    Attraction => "attraction",
    Rider => "rider",
    Avatar => "avatar",
    Submission => "submission",
});

/// An image stored in object storage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Media {
    /// Media id.
    pub id: Uuid,
    /// Uploading account.
    pub owner_id: Uuid,
    /// Storage key.
    pub storage_key: String,
    /// Purpose.
    pub purpose: MediaPurpose,
    /// MIME type of the stored bytes.
    pub content_type: String,
    /// Stored size in bytes.
    pub size_bytes: i64,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

/// Data required to record an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedia {
    /// Uploader.
    pub owner_id: Uuid,
    /// Key.
    pub storage_key: String,
    /// Purpose.
    pub purpose: MediaPurpose,
    /// MIME type.
    pub content_type: String,
    /// Size.
    pub size_bytes: i64,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}
