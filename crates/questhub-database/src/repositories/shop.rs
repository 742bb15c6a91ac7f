//! Shop repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::fee_split::{CreateFeeSplit, ShopFeeSplitRecord};
use questhub_entity::shop::{CreateShop, Shop, ShopStatus, UpdateShop};
use questhub_entity::user::UserRole;

use super::fee_split::FeeSplitRepository;
use super::user::UserRepository;
use super::{db_error, like_pattern};

/// Filters for shop listings.
#[derive(Debug, Clone, Default)]
pub struct ShopFilter {
    /// Only shops in this status.
    pub status: Option<ShopStatus>,
    /// Only shops in this province.
    pub province: Option<String>,
    /// Only shops in this category.
    pub category: Option<String>,
    /// Only shops owned by this account.
    pub owner_id: Option<Uuid>,
    /// Only shops referred by this partner.
    pub partner_id: Option<Uuid>,
    /// Substring of name or description.
    pub search: Option<String>,
}

/// Repository for shops.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: PgPool,
}

impl ShopRepository {
    /// Create a new shop repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a shop by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Shop>> {
        sqlx::query_as::<_, Shop>("SELECT * FROM shops WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find shop"))
    }

    /// Register a new shop in `pending` status.
    pub async fn create(&self, data: &CreateShop) -> AppResult<Shop> {
        sqlx::query_as::<_, Shop>(
            "INSERT INTO shops (id, owner_id, partner_id, name, description, category, phone, \
             address, province, latitude, longitude, image_keys) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.owner_id)
        .bind(data.partner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(&data.phone)
        .bind(&data.address)
        .bind(&data.province)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.image_keys)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create shop"))
    }

    /// Apply edits. When `resubmit` is set the shop returns to `pending`.
    pub async fn update(&self, id: Uuid, update: &UpdateShop, resubmit: bool) -> AppResult<Shop> {
        sqlx::query_as::<_, Shop>(
            "UPDATE shops SET name = COALESCE($2, name), description = COALESCE($3, description), \
             category = COALESCE($4, category), phone = COALESCE($5, phone), \
             address = COALESCE($6, address), province = COALESCE($7, province), \
             latitude = COALESCE($8, latitude), longitude = COALESCE($9, longitude), \
             image_keys = COALESCE($10, image_keys), \
             status = CASE WHEN $11 THEN 'pending'::shop_status ELSE status END, \
             rejection_reason = CASE WHEN $11 THEN NULL ELSE rejection_reason END, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.category)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.province)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(&update.image_keys)
        .bind(resubmit)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update shop"))?
        .ok_or_else(|| AppError::not_found(format!("Shop {id} not found")))
    }

    /// List shops with optional filters, newest first.
    pub async fn list(
        &self,
        filter: &ShopFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Shop>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::shop_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR province = $2) \
             AND ($3::text IS NULL OR LOWER(category) = LOWER($3)) \
             AND ($4::uuid IS NULL OR owner_id = $4) \
             AND ($5::uuid IS NULL OR partner_id = $5) \
             AND ($6::text IS NULL OR name ILIKE $6 OR description ILIKE $6)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shops {WHERE}"))
            .bind(filter.status)
            .bind(&filter.province)
            .bind(&filter.category)
            .bind(filter.owner_id)
            .bind(filter.partner_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count shops"))?;

        let items = sqlx::query_as::<_, Shop>(&format!(
            "SELECT * FROM shops {WHERE} ORDER BY created_at DESC LIMIT $7 OFFSET $8"
        ))
        .bind(filter.status)
        .bind(&filter.province)
        .bind(&filter.category)
        .bind(filter.owner_id)
        .bind(filter.partner_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list shops"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Approve a shop still in `expected` status: activate it, promote the
    /// owner to `shop` and write the registration fee split if one is given,
    /// all in one transaction.
    ///
    /// Returns `Ok(None)` if the status changed since it was read.
    pub async fn approve(
        &self,
        id: Uuid,
        expected: ShopStatus,
        reviewer: Uuid,
        fee: Option<&CreateFeeSplit>,
    ) -> AppResult<Option<(Shop, Option<ShopFeeSplitRecord>)>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let shop = sqlx::query_as::<_, Shop>(
            "UPDATE shops SET status = 'active', reviewed_by = $3, reviewed_at = NOW(), \
             rejection_reason = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(reviewer)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to approve shop"))?;

        let Some(shop) = shop else {
            return Ok(None);
        };

        UserRepository::promote_user(&mut tx, shop.owner_id, UserRole::Shop).await?;

        let record = match fee {
            Some(fee) => Some(FeeSplitRepository::insert(&mut tx, fee).await?),
            None => None,
        };

        tx.commit().await.map_err(db_error("Failed to commit shop approval"))?;
        Ok(Some((shop, record)))
    }

    /// Move a shop from `expected` to `status` with a review reason.
    pub async fn set_review_status(
        &self,
        id: Uuid,
        expected: ShopStatus,
        status: ShopStatus,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<Shop>> {
        sqlx::query_as::<_, Shop>(
            "UPDATE shops SET status = $3, reviewed_by = $4, reviewed_at = NOW(), \
             rejection_reason = $5, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(status)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update shop status"))
    }

    /// Credit a shop to a partner unless another partner already holds it.
    pub async fn set_partner_if_empty(
        conn: &mut PgConnection,
        shop_id: Uuid,
        partner_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE shops SET partner_id = $2, updated_at = NOW() \
             WHERE id = $1 AND partner_id IS NULL",
        )
        .bind(shop_id)
        .bind(partner_id)
        .execute(conn)
        .await
        .map_err(db_error("Failed to link shop to partner"))?;
        Ok(())
    }
}
