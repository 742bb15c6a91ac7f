//! Media upload, signing and deletion.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_database::repositories::MediaRepository;
use questhub_entity::media::{CreateMedia, Media, MediaPurpose};
use questhub_storage::StorageManager;

use crate::context::RequestContext;

/// Most keys signed in one call.
pub const MAX_SIGN_KEYS: usize = 50;

/// A stored upload and a link to fetch it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedMedia {
    #[serde(flatten)]
    pub media: Media,
    pub url: String,
}

/// A key with its time-limited URL.
#[derive(Debug, Clone, Serialize)]
pub struct SignedMedia {
    pub key: String,
    pub url: String,
}

/// Upload pipeline and signed URLs.
#[derive(Debug, Clone)]
pub struct MediaService {
    media_repo: Arc<MediaRepository>,
    storage: Arc<StorageManager>,
    rbac: Arc<RbacEnforcer>,
}

impl MediaService {
    /// Creates a new media service.
    pub fn new(
        media_repo: Arc<MediaRepository>,
        storage: Arc<StorageManager>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            media_repo,
            storage,
            rbac,
        }
    }

    /// Normalise and store an image for the caller.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        purpose: MediaPurpose,
        data: Bytes,
    ) -> AppResult<UploadedMedia> {
        let stored = self
            .storage
            .store_image(purpose.as_str(), ctx.user_id, data)
            .await?;

        let create = CreateMedia {
            owner_id: ctx.user_id,
            storage_key: stored.key.clone(),
            purpose,
            content_type: stored.content_type,
            size_bytes: i64::try_from(stored.size_bytes).unwrap_or(i64::MAX),
            width: i32::try_from(stored.width).unwrap_or(i32::MAX),
            height: i32::try_from(stored.height).unwrap_or(i32::MAX),
        };
        let media = match self.media_repo.create(&create).await {
            Ok(media) => media,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.key).await {
                    warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(e);
            }
        };

        let url = self.storage.signed_url(&media.storage_key).await?;
        info!(
            media_id = %media.id,
            owner_id = %ctx.user_id,
            purpose = %purpose,
            size_bytes = media.size_bytes,
            "Image uploaded"
        );
        Ok(UploadedMedia { media, url })
    }

    /// Time-limited URLs for stored keys, in request order.
    pub async fn sign(&self, keys: Vec<String>) -> AppResult<Vec<SignedMedia>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        if keys.len() > MAX_SIGN_KEYS {
            return Err(AppError::validation(format!(
                "At most {MAX_SIGN_KEYS} keys can be signed at once"
            )));
        }
        let urls = self.storage.signed_urls(&keys).await?;
        Ok(keys
            .into_iter()
            .zip(urls)
            .map(|(key, url)| SignedMedia { key, url })
            .collect())
    }

    /// Delete an upload: the caller's own, or any for admins.
    pub async fn delete(&self, ctx: &RequestContext, media_id: Uuid) -> AppResult<()> {
        let media = self
            .media_repo
            .find_by_id(media_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Media {media_id} not found")))?;
        if media.owner_id != ctx.user_id {
            self.rbac.require_permission(ctx.role, Permission::MediaManageAll)?;
        }

        if !self.media_repo.delete(media_id).await? {
            return Err(AppError::not_found(format!("Media {media_id} not found")));
        }
        if let Err(e) = self.storage.delete(&media.storage_key).await {
            warn!(
                key = %media.storage_key,
                error = %e,
                "Media row deleted but object removal failed"
            );
        }
        info!(media_id = %media_id, user_id = %ctx.user_id, "Media deleted");
        Ok(())
    }
}
