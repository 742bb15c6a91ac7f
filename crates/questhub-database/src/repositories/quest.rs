//! Quest repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::quest::{CreateQuest, Quest, QuestStatus, QuestType, UpdateQuest};

use super::{db_error, like_pattern};

/// Filters for quest listings.
#[derive(Debug, Clone, Default)]
pub struct QuestFilter {
    /// Only quests in this status.
    pub status: Option<QuestStatus>,
    /// Only quests of this type.
    pub quest_type: Option<QuestType>,
    /// Only quests in this province.
    pub province: Option<String>,
    /// Only quests sponsored by this shop.
    pub shop_id: Option<Uuid>,
    /// Only quests whose window contains this instant.
    pub open_at: Option<DateTime<Utc>>,
    /// Substring of title or description.
    pub search: Option<String>,
}

/// Repository for quests.
#[derive(Debug, Clone)]
pub struct QuestRepository {
    pool: PgPool,
}

impl QuestRepository {
    /// Create a new quest repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a quest by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quest>> {
        sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find quest"))
    }

    /// Create a quest.
    pub async fn create(&self, data: &CreateQuest) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>(
            "INSERT INTO quests (id, shop_id, title, description, quest_type, reward_points, \
             province, latitude, longitude, radius_meters, starts_at, ends_at, max_completions, \
             status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.shop_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.quest_type)
        .bind(data.reward_points)
        .bind(&data.province)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(data.radius_meters)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.max_completions)
        .bind(data.status)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create quest"))
    }

    /// Apply edits; `None` fields keep their value.
    pub async fn update(&self, id: Uuid, update: &UpdateQuest) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>(
            "UPDATE quests SET title = COALESCE($2, title), description = COALESCE($3, description), \
             reward_points = COALESCE($4, reward_points), province = COALESCE($5, province), \
             latitude = COALESCE($6, latitude), longitude = COALESCE($7, longitude), \
             radius_meters = COALESCE($8, radius_meters), starts_at = COALESCE($9, starts_at), \
             ends_at = COALESCE($10, ends_at), max_completions = COALESCE($11, max_completions), \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.reward_points)
        .bind(&update.province)
        .bind(update.latitude)
        .bind(update.longitude)
        .bind(update.radius_meters)
        .bind(update.starts_at)
        .bind(update.ends_at)
        .bind(update.max_completions)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update quest"))?
        .ok_or_else(|| AppError::not_found(format!("Quest {id} not found")))
    }

    /// Change a quest's lifecycle status.
    pub async fn set_status(&self, id: Uuid, status: QuestStatus) -> AppResult<Quest> {
        sqlx::query_as::<_, Quest>(
            "UPDATE quests SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update quest status"))?
        .ok_or_else(|| AppError::not_found(format!("Quest {id} not found")))
    }

    /// List quests with optional filters, newest first.
    pub async fn list(
        &self,
        filter: &QuestFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Quest>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::quest_status IS NULL OR status = $1) \
             AND ($2::quest_type IS NULL OR quest_type = $2) \
             AND ($3::text IS NULL OR province = $3) \
             AND ($4::uuid IS NULL OR shop_id = $4) \
             AND ($5::timestamptz IS NULL OR ((starts_at IS NULL OR starts_at <= $5) \
                  AND (ends_at IS NULL OR ends_at > $5))) \
             AND ($6::text IS NULL OR title ILIKE $6 OR description ILIKE $6)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM quests {WHERE}"))
            .bind(filter.status)
            .bind(filter.quest_type)
            .bind(&filter.province)
            .bind(filter.shop_id)
            .bind(filter.open_at)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count quests"))?;

        let items = sqlx::query_as::<_, Quest>(&format!(
            "SELECT * FROM quests {WHERE} ORDER BY created_at DESC LIMIT $7 OFFSET $8"
        ))
        .bind(filter.status)
        .bind(filter.quest_type)
        .bind(&filter.province)
        .bind(filter.shop_id)
        .bind(filter.open_at)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list quests"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Close every active quest whose window ended before `now`.
    pub async fn close_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE quests SET status = 'closed', updated_at = NOW() \
             WHERE status = 'active' AND ends_at IS NOT NULL AND ends_at <= $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to close expired quests"))?;
        Ok(result.rows_affected())
    }
}
