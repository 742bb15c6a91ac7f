//! Quest authoring and discovery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::quest::QuestFilter;
use questhub_database::repositories::{QuestRepository, ShopRepository};
use questhub_entity::quest::{CreateQuest, Quest, QuestStatus, QuestType, UpdateQuest};

use super::rules::{self, QuestShape};
use crate::context::RequestContext;
use crate::validate;

/// A new quest as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestRequest {
    /// Sponsoring shop; required unless the caller is an admin.
    pub shop_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub quest_type: QuestType,
    pub reward_points: i64,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_completions: Option<i32>,
}

/// Editable quest fields; `None` keeps the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub reward_points: Option<i64>,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_completions: Option<i32>,
}

/// Quest authoring, publishing and listing.
#[derive(Debug, Clone)]
pub struct QuestService {
    quest_repo: Arc<QuestRepository>,
    shop_repo: Arc<ShopRepository>,
    rbac: Arc<RbacEnforcer>,
    max_reward_points: i64,
}

impl QuestService {
    /// Creates a new quest service.
    pub fn new(
        quest_repo: Arc<QuestRepository>,
        shop_repo: Arc<ShopRepository>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            quest_repo,
            shop_repo,
            rbac,
            max_reward_points: config.max_reward_points,
        }
    }

    /// Create a draft quest.
    ///
    /// Admins create platform quests, optionally tied to a shop. Everyone
    /// else must name an active shop they own.
    pub async fn create(&self, ctx: &RequestContext, req: QuestRequest) -> AppResult<Quest> {
        let admin = self.rbac.has_permission(ctx.role, Permission::QuestManageAll);
        match req.shop_id {
            Some(shop_id) => {
                let shop = self
                    .shop_repo
                    .find_by_id(shop_id)
                    .await?
                    .ok_or_else(|| AppError::validation(format!("Shop {shop_id} does not exist")))?;
                if !admin && shop.owner_id != ctx.user_id {
                    return Err(AppError::authorization(
                        "You can only create quests for your own shop",
                    ));
                }
                if !shop.is_active() {
                    return Err(AppError::validation("Quests need an active shop"));
                }
            }
            None if !admin => {
                return Err(AppError::validation("shop_id is required"));
            }
            None => {}
        }

        let shape = QuestShape {
            quest_type: req.quest_type,
            reward_points: req.reward_points,
            latitude: req.latitude,
            longitude: req.longitude,
            radius_meters: req.radius_meters,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            max_completions: req.max_completions,
        };
        validate::coordinates(req.latitude, req.longitude)?;
        rules::check_quest(&shape, self.max_reward_points)?;

        let data = CreateQuest {
            shop_id: req.shop_id,
            title: validate::text("title", &req.title, 3, 200)?,
            description: validate::text("description", &req.description, 1, 4000)?,
            quest_type: req.quest_type,
            reward_points: req.reward_points,
            province: validate::optional_province(req.province.as_deref())?,
            latitude: req.latitude,
            longitude: req.longitude,
            radius_meters: req.radius_meters,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            max_completions: req.max_completions,
            status: QuestStatus::Draft,
            created_by: ctx.user_id,
        };
        let quest = self.quest_repo.create(&data).await?;
        info!(
            quest_id = %quest.id,
            shop_id = ?quest.shop_id,
            quest_type = %quest.quest_type,
            reward_points = quest.reward_points,
            "Quest created"
        );
        Ok(quest)
    }

    /// Edit a quest that is not closed.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        quest_id: Uuid,
        req: QuestUpdate,
    ) -> AppResult<Quest> {
        let quest = self.managed(ctx, quest_id).await?;
        if quest.status == QuestStatus::Closed {
            return Err(AppError::conflict("Closed quests cannot be edited"));
        }
        validate::coordinates(req.latitude, req.longitude)?;

        let mut shape = QuestShape::of(&quest);
        shape.reward_points = req.reward_points.unwrap_or(shape.reward_points);
        shape.latitude = req.latitude.or(shape.latitude);
        shape.longitude = req.longitude.or(shape.longitude);
        shape.radius_meters = req.radius_meters.or(shape.radius_meters);
        shape.starts_at = req.starts_at.or(shape.starts_at);
        shape.ends_at = req.ends_at.or(shape.ends_at);
        shape.max_completions = req.max_completions.or(shape.max_completions);
        rules::check_quest(&shape, self.max_reward_points)?;
        if shape
            .max_completions
            .is_some_and(|max| max < quest.completion_count)
        {
            return Err(AppError::validation(format!(
                "max_completions cannot drop below the {} completions already approved",
                quest.completion_count
            )));
        }

        let update = UpdateQuest {
            title: match req.title.as_deref() {
                Some(t) => Some(validate::text("title", t, 3, 200)?),
                None => None,
            },
            description: match req.description.as_deref() {
                Some(d) => Some(validate::text("description", d, 1, 4000)?),
                None => None,
            },
            reward_points: req.reward_points,
            province: validate::optional_province(req.province.as_deref())?,
            latitude: req.latitude,
            longitude: req.longitude,
            radius_meters: req.radius_meters,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            max_completions: req.max_completions,
        };
        let quest = self.quest_repo.update(quest_id, &update).await?;
        info!(quest_id = %quest_id, user_id = %ctx.user_id, "Quest updated");
        Ok(quest)
    }

    /// Make a draft quest live.
    pub async fn publish(&self, ctx: &RequestContext, quest_id: Uuid) -> AppResult<Quest> {
        let quest = self.managed(ctx, quest_id).await?;
        if quest.status != QuestStatus::Draft {
            return Err(AppError::conflict(format!("Quest is already {}", quest.status)));
        }
        if quest.ends_at.is_some_and(|end| end <= Utc::now()) {
            return Err(AppError::validation("Quest window has already ended"));
        }
        let quest = self.quest_repo.set_status(quest_id, QuestStatus::Active).await?;
        info!(quest_id = %quest_id, user_id = %ctx.user_id, "Quest published");
        Ok(quest)
    }

    /// Stop a quest from taking submissions.
    pub async fn close(&self, ctx: &RequestContext, quest_id: Uuid) -> AppResult<Quest> {
        let quest = self.managed(ctx, quest_id).await?;
        if quest.status == QuestStatus::Closed {
            return Err(AppError::conflict("Quest is already closed"));
        }
        let quest = self.quest_repo.set_status(quest_id, QuestStatus::Closed).await?;
        info!(quest_id = %quest_id, user_id = %ctx.user_id, "Quest closed");
        Ok(quest)
    }

    /// Live quests inside their window.
    pub async fn list_public(
        &self,
        mut filter: QuestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Quest>> {
        filter.status = Some(QuestStatus::Active);
        filter.open_at = Some(Utc::now());
        self.quest_repo.list(&filter, &page).await
    }

    /// Quests in any status (admin).
    pub async fn list_all(
        &self,
        ctx: &RequestContext,
        filter: QuestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Quest>> {
        self.rbac.require_permission(ctx.role, Permission::QuestManageAll)?;
        self.quest_repo.list(&filter, &page).await
    }

    /// A quest. Drafts are visible only to those who manage them.
    pub async fn get(&self, ctx: Option<&RequestContext>, quest_id: Uuid) -> AppResult<Quest> {
        let quest = self.find(quest_id).await?;
        if quest.status != QuestStatus::Draft {
            return Ok(quest);
        }
        if let Some(ctx) = ctx {
            if self.can_manage(ctx, &quest).await? {
                return Ok(quest);
            }
        }
        Err(AppError::not_found(format!("Quest {quest_id} not found")))
    }

    /// Close every quest whose window has ended.
    pub async fn close_expired(&self) -> AppResult<u64> {
        let closed = self.quest_repo.close_expired(Utc::now()).await?;
        if closed > 0 {
            info!(closed, "Closed expired quests");
        }
        Ok(closed)
    }

    /// Whether the caller may edit the quest and review its submissions:
    /// admins, the creator, and the sponsoring shop's owner.
    pub async fn can_manage(&self, ctx: &RequestContext, quest: &Quest) -> AppResult<bool> {
        if self.rbac.has_permission(ctx.role, Permission::QuestManageAll)
            || quest.created_by == ctx.user_id
        {
            return Ok(true);
        }
        let Some(shop_id) = quest.shop_id else {
            return Ok(false);
        };
        Ok(self
            .shop_repo
            .find_by_id(shop_id)
            .await?
            .is_some_and(|shop| shop.owner_id == ctx.user_id))
    }

    pub(crate) async fn find(&self, quest_id: Uuid) -> AppResult<Quest> {
        self.quest_repo
            .find_by_id(quest_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Quest {quest_id} not found")))
    }

    async fn managed(&self, ctx: &RequestContext, quest_id: Uuid) -> AppResult<Quest> {
        let quest = self.find(quest_id).await?;
        if !self.can_manage(ctx, &quest).await? {
            return Err(AppError::authorization("You cannot manage this quest"));
        }
        Ok(quest)
    }
}
