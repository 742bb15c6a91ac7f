//! Shop fee split repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::fee_split::{CreateFeeSplit, FeeSplitSummary, FeeType, ShopFeeSplitRecord};

use super::db_error;

/// Filters for fee split listings and summaries.
#[derive(Debug, Clone, Default)]
pub struct FeeSplitFilter {
    /// Only records for this shop.
    pub shop_id: Option<Uuid>,
    /// Only records crediting this partner.
    pub partner_id: Option<Uuid>,
    /// Only records of this fee type.
    pub fee_type: Option<FeeType>,
}

const WHERE: &str = "WHERE ($1::uuid IS NULL OR shop_id = $1) \
     AND ($2::uuid IS NULL OR partner_id = $2) \
     AND ($3::fee_type IS NULL OR fee_type = $3)";

/// Repository for the append-only commission ledger.
#[derive(Debug, Clone)]
pub struct FeeSplitRepository {
    pool: PgPool,
}

impl FeeSplitRepository {
    /// Create a new fee split repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a split.
    pub async fn create(&self, data: &CreateFeeSplit) -> AppResult<ShopFeeSplitRecord> {
        let mut conn = self.pool.acquire().await.map_err(db_error("Failed to acquire connection"))?;
        Self::insert(&mut conn, data).await
    }

    /// Record a split on an open connection or transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        data: &CreateFeeSplit,
    ) -> AppResult<ShopFeeSplitRecord> {
        sqlx::query_as::<_, ShopFeeSplitRecord>(
            "INSERT INTO shop_fee_split_records (id, shop_id, partner_id, fee_type, gross_amount, \
             platform_amount, partner_amount, commission_bps, note, recorded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.shop_id)
        .bind(data.partner_id)
        .bind(data.fee_type)
        .bind(data.gross_amount)
        .bind(data.platform_amount)
        .bind(data.partner_amount)
        .bind(data.commission_bps)
        .bind(&data.note)
        .bind(data.recorded_by)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to record fee split"))
    }

    /// List records, newest first.
    pub async fn list(
        &self,
        filter: &FeeSplitFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShopFeeSplitRecord>> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM shop_fee_split_records {WHERE}"
        ))
        .bind(filter.shop_id)
        .bind(filter.partner_id)
        .bind(filter.fee_type)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count fee splits"))?;

        let items = sqlx::query_as::<_, ShopFeeSplitRecord>(&format!(
            "SELECT * FROM shop_fee_split_records {WHERE} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.shop_id)
        .bind(filter.partner_id)
        .bind(filter.fee_type)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list fee splits"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Sum amounts over the filtered records.
    pub async fn summary(&self, filter: &FeeSplitFilter) -> AppResult<FeeSplitSummary> {
        sqlx::query_as::<_, FeeSplitSummary>(&format!(
            "SELECT COUNT(*) AS record_count, \
             COALESCE(SUM(gross_amount), 0)::BIGINT AS gross_total, \
             COALESCE(SUM(platform_amount), 0)::BIGINT AS platform_total, \
             COALESCE(SUM(partner_amount), 0)::BIGINT AS partner_total \
             FROM shop_fee_split_records {WHERE}"
        ))
        .bind(filter.shop_id)
        .bind(filter.partner_id)
        .bind(filter.fee_type)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to summarise fee splits"))
    }
}
