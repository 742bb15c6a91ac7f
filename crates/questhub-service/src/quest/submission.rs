//! Quest submissions and their review.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::{MediaRepository, SubmissionRepository};
use questhub_entity::quest::{CreateSubmission, QuestSubmission, SubmissionStatus};

use super::rules::{self, Proof};
use super::service::QuestService;
use crate::context::RequestContext;
use crate::validate;

/// Proof of completing a quest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionRequest {
    /// Link to the post or content.
    pub proof_url: Option<String>,
    /// Keys of uploaded photos.
    #[serde(default)]
    pub image_keys: Vec<String>,
    /// Where the user checked in.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Free-form note for the reviewer.
    pub note: Option<String>,
}

/// Submitting, reviewing and listing quest completions.
#[derive(Debug, Clone)]
pub struct SubmissionService {
    submission_repo: Arc<SubmissionRepository>,
    media_repo: Arc<MediaRepository>,
    quests: Arc<QuestService>,
    rbac: Arc<RbacEnforcer>,
    max_images: usize,
}

impl SubmissionService {
    /// Creates a new submission service.
    pub fn new(
        submission_repo: Arc<SubmissionRepository>,
        media_repo: Arc<MediaRepository>,
        quests: Arc<QuestService>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            submission_repo,
            media_repo,
            quests,
            rbac,
            max_images: config.max_images_per_entity,
        }
    }

    /// Submit proof for a quest.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        quest_id: Uuid,
        req: SubmissionRequest,
    ) -> AppResult<QuestSubmission> {
        self.rbac.require_permission(ctx.role, Permission::QuestSubmit)?;
        let quest = self.quests.find(quest_id).await?;

        rules::check_open(&quest, Utc::now())?;
        let manages = self.quests.can_manage(ctx, &quest).await?;
        rules::check_submitter(manages, ctx.is_admin())?;

        let proof_url = rules::proof_url(req.proof_url.as_deref())?;
        let location = validate::coordinates(req.latitude, req.longitude)?;
        let image_keys = validate::image_keys(req.image_keys, self.max_images)?;
        validate::keys_owned(&self.media_repo, ctx.user_id, &image_keys).await?;

        rules::check_proof(
            &quest,
            &Proof {
                proof_url: proof_url.as_deref(),
                image_count: image_keys.len(),
                location,
            },
        )?;

        let data = CreateSubmission {
            quest_id,
            user_id: ctx.user_id,
            proof_url,
            image_keys,
            latitude: location.map(|p| p.latitude),
            longitude: location.map(|p| p.longitude),
            note: validate::optional_text("note", req.note.as_deref(), 1000)?,
        };
        let submission = self.submission_repo.create(&data).await?;
        info!(
            submission_id = %submission.id,
            quest_id = %quest_id,
            user_id = %ctx.user_id,
            "Quest submission received"
        );
        Ok(submission)
    }

    /// Approve a pending submission and credit the reward.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        submission_id: Uuid,
    ) -> AppResult<QuestSubmission> {
        let submission = self.reviewable(ctx, submission_id).await?;
        let approved = self.submission_repo.approve(submission.id, ctx.user_id).await?;
        info!(
            submission_id = %submission_id,
            quest_id = %approved.quest_id,
            user_id = %approved.user_id,
            points = approved.points_awarded,
            reviewer = %ctx.user_id,
            "Quest submission approved"
        );
        Ok(approved)
    }

    /// Reject a pending submission with a reason.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        submission_id: Uuid,
        reason: &str,
    ) -> AppResult<QuestSubmission> {
        let reason = validate::reason(reason)?;
        let submission = self.reviewable(ctx, submission_id).await?;
        if submission.status != SubmissionStatus::Pending {
            return Err(AppError::conflict(format!(
                "Submission is already {}",
                submission.status
            )));
        }
        let rejected = self
            .submission_repo
            .reject(submission_id, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Submission was reviewed meanwhile"))?;
        info!(submission_id = %submission_id, reviewer = %ctx.user_id, "Quest submission rejected");
        Ok(rejected)
    }

    /// Submissions for a quest, for those who review it.
    pub async fn list_for_quest(
        &self,
        ctx: &RequestContext,
        quest_id: Uuid,
        status: Option<SubmissionStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<QuestSubmission>> {
        let quest = self.quests.find(quest_id).await?;
        if !self.quests.can_manage(ctx, &quest).await? {
            return Err(AppError::authorization("You cannot review this quest"));
        }
        self.submission_repo.list_for_quest(quest_id, status, &page).await
    }

    /// The caller's own submissions.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<QuestSubmission>> {
        self.submission_repo.list_for_user(ctx.user_id, &page).await
    }

    async fn reviewable(
        &self,
        ctx: &RequestContext,
        submission_id: Uuid,
    ) -> AppResult<QuestSubmission> {
        let submission = self
            .submission_repo
            .find_by_id(submission_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Submission {submission_id} not found")))?;
        let quest = self.quests.find(submission.quest_id).await?;
        if !self.quests.can_manage(ctx, &quest).await? {
            return Err(AppError::authorization("You cannot review this submission"));
        }
        if submission.user_id == ctx.user_id && !ctx.is_admin() {
            return Err(AppError::authorization("You cannot review your own submission"));
        }
        Ok(submission)
    }
}
