//! Tourist attraction repository.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::attraction::{Attraction, CreateAttraction, UpdateAttraction};
use questhub_entity::review::ReviewStatus;

use super::{db_error, like_pattern};

/// Filters for attraction listings.
#[derive(Debug, Clone, Default)]
pub struct AttractionFilter {
    /// Only attractions in this review status.
    pub status: Option<ReviewStatus>,
    /// Only attractions in this province.
    pub province: Option<String>,
    /// Only attractions in this category.
    pub category: Option<String>,
    /// Only attractions submitted by this account.
    pub submitted_by: Option<Uuid>,
    /// Substring of name or description.
    pub search: Option<String>,
}

/// Repository for tourist attractions.
#[derive(Debug, Clone)]
pub struct AttractionRepository {
    pool: PgPool,
}

impl AttractionRepository {
    /// Create a new attraction repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an attraction by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Attraction>> {
        sqlx::query_as::<_, Attraction>("SELECT * FROM tourist_attractions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find attraction"))
    }

    /// Create an attraction.
    pub async fn create(&self, data: &CreateAttraction) -> AppResult<Attraction> {
        sqlx::query_as::<_, Attraction>(
            "INSERT INTO tourist_attractions (id, name, description, category, province, \
             latitude, longitude, address, image_keys, status, submitted_by, partner_id, \
             reviewed_by, reviewed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
                     CASE WHEN $10 = 'approved'::review_status THEN $11 END, \
                     CASE WHEN $10 = 'approved'::review_status THEN NOW() END) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(&data.province)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.address)
        .bind(&data.image_keys)
        .bind(data.status)
        .bind(data.submitted_by)
        .bind(data.partner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create attraction"))
    }

    /// Apply edits. When `resubmit` is set the attraction goes back to review.
    pub async fn update(
        &self,
        id: Uuid,
        update: &UpdateAttraction,
        resubmit: bool,
    ) -> AppResult<Attraction> {
        sqlx::query_as::<_, Attraction>(
            "UPDATE tourist_attractions SET name = COALESCE($2, name), \
             description = COALESCE($3, description), category = COALESCE($4, category), \
             province = COALESCE($5, province), latitude = COALESCE($6, latitude), \
             longitude = COALESCE($7, longitude), address = COALESCE($8, address), \
             image_keys = COALESCE($9, image_keys), \
             status = CASE WHEN $10 THEN 'pending'::review_status ELSE status END, \
             rejection_reason = CASE WHEN $10 THEN NULL ELSE rejection_reason END, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.category)
        .bind(&update.province)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(&update.address)
        .bind(&update.image_keys)
        .bind(resubmit)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update attraction"))?
        .ok_or_else(|| AppError::not_found(format!("Attraction {id} not found")))
    }

    /// Record an admin decision on an attraction still in `expected` status.
    pub async fn review(
        &self,
        id: Uuid,
        expected: ReviewStatus,
        status: ReviewStatus,
        reviewer: Uuid,
        reason: Option<&str>,
    ) -> AppResult<Option<Attraction>> {
        sqlx::query_as::<_, Attraction>(
            "UPDATE tourist_attractions SET status = $3, reviewed_by = $4, reviewed_at = NOW(), \
             rejection_reason = $5, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(status)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to review attraction"))
    }

    /// Delete an attraction. Returns `true` if a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tourist_attractions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete attraction"))?;
        Ok(result.rows_affected() > 0)
    }

    /// List attractions with optional filters, newest first.
    pub async fn list(
        &self,
        filter: &AttractionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Attraction>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::review_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR province = $2) \
             AND ($3::text IS NULL OR LOWER(category) = LOWER($3)) \
             AND ($4::uuid IS NULL OR submitted_by = $4) \
             AND ($5::text IS NULL OR name ILIKE $5 OR description ILIKE $5)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM tourist_attractions {WHERE}"))
                .bind(filter.status)
                .bind(&filter.province)
                .bind(&filter.category)
                .bind(filter.submitted_by)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count attractions"))?;

        let items = sqlx::query_as::<_, Attraction>(&format!(
            "SELECT * FROM tourist_attractions {WHERE} ORDER BY created_at DESC LIMIT $6 OFFSET $7"
        ))
        .bind(filter.status)
        .bind(&filter.province)
        .bind(&filter.category)
        .bind(filter.submitted_by)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list attractions"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }
}
