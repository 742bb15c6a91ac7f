//! Point ledger repository.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::user::PointTransaction;

use super::db_error;

/// Read access to the point ledger. Rows are written by
/// [`SubmissionRepository::approve`](super::SubmissionRepository::approve).
#[derive(Debug, Clone)]
pub struct PointRepository {
    pool: PgPool,
}

impl PointRepository {
    /// Create a new point repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A user's ledger, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<PointTransaction>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM point_transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count point transactions"))?;

        let items = sqlx::query_as::<_, PointTransaction>(
            "SELECT * FROM point_transactions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list point transactions"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }
}
