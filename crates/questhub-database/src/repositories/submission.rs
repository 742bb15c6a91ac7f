//! Quest submission repository, including the approval/points transaction.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::quest::{CreateSubmission, Quest, QuestSubmission, SubmissionStatus};

use super::{db_error, unique_violation};

/// Ledger reason written when a submission is approved.
pub const QUEST_REWARD_REASON: &str = "quest_reward";

/// Repository for quest submissions.
#[derive(Debug, Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a submission by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<QuestSubmission>> {
        sqlx::query_as::<_, QuestSubmission>("SELECT * FROM quest_submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find submission"))
    }

    /// Store a new pending submission. A user holds at most one pending or
    /// approved submission per quest.
    pub async fn create(&self, data: &CreateSubmission) -> AppResult<QuestSubmission> {
        sqlx::query_as::<_, QuestSubmission>(
            "INSERT INTO quest_submissions (id, quest_id, user_id, proof_url, image_keys, \
             latitude, longitude, note) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.quest_id)
        .bind(data.user_id)
        .bind(&data.proof_url)
        .bind(&data.image_keys)
        .bind(data.latitude)
        .bind(data.longitude)
        .bind(&data.note)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("uq_quest_submissions_live") => AppError::conflict(
                "You already have a pending or approved submission for this quest",
            ),
            _ => db_error("Failed to create submission")(e),
        })
    }

    /// Submissions for a quest, optionally filtered by status.
    pub async fn list_for_quest(
        &self,
        quest_id: Uuid,
        status: Option<SubmissionStatus>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuestSubmission>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quest_submissions \
             WHERE quest_id = $1 AND ($2::submission_status IS NULL OR status = $2)",
        )
        .bind(quest_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count submissions"))?;

        let items = sqlx::query_as::<_, QuestSubmission>(
            "SELECT * FROM quest_submissions \
             WHERE quest_id = $1 AND ($2::submission_status IS NULL OR status = $2) \
             ORDER BY created_at ASC LIMIT $3 OFFSET $4",
        )
        .bind(quest_id)
        .bind(status)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list submissions"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// A user's submissions, newest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<QuestSubmission>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quest_submissions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to count submissions"))?;

        let items = sqlx::query_as::<_, QuestSubmission>(
            "SELECT * FROM quest_submissions WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list submissions"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Approve a pending submission. In one transaction: the submission is
    /// marked approved, the quest's completion count is incremented (refused
    /// once the cap is reached), the reward is added to the user's balance
    /// and a ledger row is written.
    pub async fn approve(&self, id: Uuid, reviewer: Uuid) -> AppResult<QuestSubmission> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let submission = sqlx::query_as::<_, QuestSubmission>(
            "SELECT * FROM quest_submissions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock submission"))?
        .ok_or_else(|| AppError::not_found(format!("Submission {id} not found")))?;

        if submission.status != SubmissionStatus::Pending {
            return Err(AppError::conflict(format!(
                "Submission is already {}",
                submission.status
            )));
        }

        let quest = sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = $1 FOR UPDATE")
            .bind(submission.quest_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to lock quest"))?;

        if quest.is_full() {
            return Err(AppError::conflict("Quest has reached its completion limit"));
        }

        let approved = sqlx::query_as::<_, QuestSubmission>(
            "UPDATE quest_submissions SET status = 'approved', points_awarded = $2, \
             reviewed_by = $3, reviewed_at = NOW(), rejection_reason = NULL \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(quest.reward_points)
        .bind(reviewer)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to approve submission"))?;

        sqlx::query(
            "UPDATE quests SET completion_count = completion_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(quest.id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to count completion"))?;

        sqlx::query(
            "UPDATE users SET points_balance = points_balance + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(approved.user_id)
        .bind(quest.reward_points)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to credit points"))?;

        sqlx::query(
            "INSERT INTO point_transactions (id, user_id, delta, reason, submission_id) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::now_v7())
        .bind(approved.user_id)
        .bind(quest.reward_points)
        .bind(QUEST_REWARD_REASON)
        .bind(approved.id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to write point ledger"))?;

        tx.commit().await.map_err(db_error("Failed to commit approval"))?;
        Ok(approved)
    }

    /// Reject a pending submission.
    pub async fn reject(
        &self,
        id: Uuid,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<QuestSubmission>> {
        sqlx::query_as::<_, QuestSubmission>(
            "UPDATE quest_submissions SET status = 'rejected', reviewed_by = $2, \
             reviewed_at = NOW(), rejection_reason = $3 \
             WHERE id = $1 AND status = 'pending' RETURNING *",
        )
        .bind(id)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to reject submission"))
    }
}
