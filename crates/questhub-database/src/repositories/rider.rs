//! Rider repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::review::ReviewStatus;
use questhub_entity::rider::{CreateRider, Rider, VehicleType};
use questhub_entity::user::UserRole;

use super::user::UserRepository;
use super::{db_error, like_pattern, unique_violation};

/// Filters for rider listings.
#[derive(Debug, Clone, Default)]
pub struct RiderFilter {
    /// Only riders in this review status.
    pub status: Option<ReviewStatus>,
    /// Only riders in this province.
    pub province: Option<String>,
    /// Only riders referred by this partner.
    pub partner_id: Option<Uuid>,
    /// Substring of name, phone or plate.
    pub search: Option<String>,
}

/// Fields a rider may edit; `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct RiderProfileUpdate {
    /// Legal name.
    pub full_name: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Province.
    pub province: Option<String>,
    /// Vehicle.
    pub vehicle_type: Option<VehicleType>,
    /// Plate.
    pub license_plate: Option<String>,
    /// ID card photo.
    pub id_card_image_key: Option<String>,
}

/// Repository for rider applications.
#[derive(Debug, Clone)]
pub struct RiderRepository {
    pool: PgPool,
}

impl RiderRepository {
    /// Create a new rider repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a rider by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Rider>> {
        sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find rider"))
    }

    /// Find the rider profile owned by an account.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Rider>> {
        sqlx::query_as::<_, Rider>("SELECT * FROM riders WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find rider by user"))
    }

    /// File a rider application.
    pub async fn create(&self, data: &CreateRider) -> AppResult<Rider> {
        sqlx::query_as::<_, Rider>(
            "INSERT INTO riders (id, user_id, partner_id, full_name, phone, province, \
             vehicle_type, license_plate, id_card_image_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(data.partner_id)
        .bind(&data.full_name)
        .bind(&data.phone)
        .bind(&data.province)
        .bind(data.vehicle_type)
        .bind(&data.license_plate)
        .bind(&data.id_card_image_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("riders_user_id_key") => {
                AppError::conflict("A rider application already exists for this account")
            }
            _ => db_error("Failed to create rider")(e),
        })
    }

    /// Apply edits. When `resubmit` is set the application returns to review.
    pub async fn update(
        &self,
        id: Uuid,
        update: &RiderProfileUpdate,
        resubmit: bool,
    ) -> AppResult<Rider> {
        sqlx::query_as::<_, Rider>(
            "UPDATE riders SET full_name = COALESCE($2, full_name), phone = COALESCE($3, phone), \
             province = COALESCE($4, province), vehicle_type = COALESCE($5, vehicle_type), \
             license_plate = COALESCE($6, license_plate), \
             id_card_image_key = COALESCE($7, id_card_image_key), \
             status = CASE WHEN $8 THEN 'pending'::review_status ELSE status END, \
             rejection_reason = CASE WHEN $8 THEN NULL ELSE rejection_reason END, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.province)
        .bind(update.vehicle_type)
        .bind(&update.license_plate)
        .bind(&update.id_card_image_key)
        .bind(resubmit)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update rider"))?
        .ok_or_else(|| AppError::not_found(format!("Rider {id} not found")))
    }

    /// List riders with optional filters.
    pub async fn list(
        &self,
        filter: &RiderFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Rider>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::review_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR province = $2) \
             AND ($3::uuid IS NULL OR partner_id = $3) \
             AND ($4::text IS NULL OR full_name ILIKE $4 OR phone ILIKE $4 OR license_plate ILIKE $4)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM riders {WHERE}"))
            .bind(filter.status)
            .bind(&filter.province)
            .bind(filter.partner_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count riders"))?;

        let items = sqlx::query_as::<_, Rider>(&format!(
            "SELECT * FROM riders {WHERE} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(filter.status)
        .bind(&filter.province)
        .bind(filter.partner_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list riders"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Approve an application still in `expected` status and promote the
    /// owner to `rider`, atomically.
    pub async fn approve(
        &self,
        id: Uuid,
        expected: ReviewStatus,
        reviewer: Uuid,
    ) -> AppResult<Option<Rider>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let rider = sqlx::query_as::<_, Rider>(
            "UPDATE riders SET status = 'approved', reviewed_by = $3, reviewed_at = NOW(), \
             rejection_reason = NULL, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(reviewer)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to approve rider"))?;

        let Some(rider) = rider else {
            return Ok(None);
        };

        UserRepository::promote_user(&mut tx, rider.user_id, UserRole::Rider).await?;
        tx.commit().await.map_err(db_error("Failed to commit rider approval"))?;
        Ok(Some(rider))
    }

    /// Reject an application still in `expected` status.
    pub async fn reject(
        &self,
        id: Uuid,
        expected: ReviewStatus,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<Rider>> {
        sqlx::query_as::<_, Rider>(
            "UPDATE riders SET status = 'rejected', reviewed_by = $3, reviewed_at = NOW(), \
             rejection_reason = $4, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to reject rider"))
    }

    /// Suspend an approved rider and demote the owner, atomically.
    pub async fn suspend(
        &self,
        id: Uuid,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<Rider>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let rider = sqlx::query_as::<_, Rider>(
            "UPDATE riders SET status = 'suspended', reviewed_by = $2, reviewed_at = NOW(), \
             rejection_reason = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'approved' RETURNING *",
        )
        .bind(id)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to suspend rider"))?;

        let Some(rider) = rider else {
            return Ok(None);
        };

        UserRepository::demote_user(&mut tx, rider.user_id, UserRole::Rider).await?;
        tx.commit().await.map_err(db_error("Failed to commit rider suspension"))?;
        Ok(Some(rider))
    }
}
