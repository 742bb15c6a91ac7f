//! Media repository.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::result::AppResult;
use questhub_entity::media::{CreateMedia, Media};

use super::db_error;

/// Repository for uploaded media records.
#[derive(Debug, Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    /// Create a new media repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a media record by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Media>> {
        sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find media"))
    }

    /// Record an upload.
    pub async fn create(&self, data: &CreateMedia) -> AppResult<Media> {
        sqlx::query_as::<_, Media>(
            "INSERT INTO media (id, owner_id, storage_key, purpose, content_type, size_bytes, \
             width, height) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.owner_id)
        .bind(&data.storage_key)
        .bind(data.purpose)
        .bind(&data.content_type)
        .bind(data.size_bytes)
        .bind(data.width)
        .bind(data.height)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to record media"))
    }

    /// Keys among `keys` that were uploaded by `owner_id`.
    pub async fn keys_owned_by(&self, owner_id: Uuid, keys: &[String]) -> AppResult<Vec<String>> {
        sqlx::query_scalar(
            "SELECT storage_key FROM media WHERE owner_id = $1 AND storage_key = ANY($2)",
        )
        .bind(owner_id)
        .bind(keys)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to check media ownership"))
    }

    /// Delete a media record. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete media"))?;
        Ok(result.rows_affected() > 0)
    }
}
