//! Attraction submission, curation and discovery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::attraction::AttractionFilter;
use questhub_database::repositories::{AttractionRepository, MediaRepository, PartnerRepository};
use questhub_entity::ReviewStatus;
use questhub_entity::attraction::{Attraction, CreateAttraction, UpdateAttraction};

use crate::context::RequestContext;
use crate::validate;

/// A new attraction as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttractionRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    #[serde(default)]
    pub image_keys: Vec<String>,
}

/// Editable attraction fields; `None` keeps the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttractionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub image_keys: Option<Vec<String>>,
}

/// Attraction workflow.
#[derive(Debug, Clone)]
pub struct AttractionService {
    attraction_repo: Arc<AttractionRepository>,
    partner_repo: Arc<PartnerRepository>,
    media_repo: Arc<MediaRepository>,
    rbac: Arc<RbacEnforcer>,
    max_images: usize,
}

impl AttractionService {
    /// Creates a new attraction service.
    pub fn new(
        attraction_repo: Arc<AttractionRepository>,
        partner_repo: Arc<PartnerRepository>,
        media_repo: Arc<MediaRepository>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            attraction_repo,
            partner_repo,
            media_repo,
            rbac,
            max_images: config.max_images_per_entity,
        }
    }

    /// Submit an attraction. Partner submissions wait for review; admin
    /// ones are published straight away.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: AttractionRequest,
    ) -> AppResult<Attraction> {
        self.rbac.require_permission(ctx.role, Permission::AttractionSubmit)?;
        let admin = self.rbac.has_permission(ctx.role, Permission::AttractionReview);

        let partner_id = if admin {
            None
        } else {
            let partner = self
                .partner_repo
                .find_by_user_id(ctx.user_id)
                .await?
                .filter(|p| p.is_approved())
                .ok_or_else(|| AppError::authorization("An approved partner account is required"))?;
            Some(partner.id)
        };

        let point = validate::coordinates(Some(req.latitude), Some(req.longitude))?
            .ok_or_else(|| AppError::validation("latitude and longitude are required"))?;
        let image_keys = validate::image_keys(req.image_keys, self.max_images)?;
        validate::keys_owned(&self.media_repo, ctx.user_id, &image_keys).await?;

        let data = CreateAttraction {
            name: validate::text("name", &req.name, 2, 200)?,
            description: validate::optional_text("description", req.description.as_deref(), 4000)?,
            category: validate::category(&req.category)?,
            province: validate::province(&req.province)?,
            latitude: point.latitude,
            longitude: point.longitude,
            address: validate::optional_text("address", req.address.as_deref(), 500)?,
            image_keys,
            status: if admin {
                ReviewStatus::Approved
            } else {
                ReviewStatus::Pending
            },
            submitted_by: ctx.user_id,
            partner_id,
        };
        let attraction = self.attraction_repo.create(&data).await?;
        info!(
            attraction_id = %attraction.id,
            submitted_by = %ctx.user_id,
            status = %attraction.status,
            "Attraction submitted"
        );
        Ok(attraction)
    }

    /// Edit an attraction. Submitter edits of a reviewed attraction send it
    /// back to review.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        attraction_id: Uuid,
        req: AttractionUpdate,
    ) -> AppResult<Attraction> {
        let attraction = self.find(attraction_id).await?;
        let admin = self.rbac.has_permission(ctx.role, Permission::AttractionReview);
        if !admin && attraction.submitted_by != ctx.user_id {
            return Err(AppError::authorization("Only the submitter can edit this attraction"));
        }

        let point = validate::coordinates(req.latitude, req.longitude)?;
        let image_keys = match req.image_keys {
            Some(keys) => {
                let keys = validate::image_keys(keys, self.max_images)?;
                validate::keys_owned(&self.media_repo, attraction.submitted_by, &keys).await?;
                Some(keys)
            }
            None => None,
        };
        let update = UpdateAttraction {
            name: match req.name.as_deref() {
                Some(name) => Some(validate::text("name", name, 2, 200)?),
                None => None,
            },
            description: validate::optional_text("description", req.description.as_deref(), 4000)?,
            category: match req.category.as_deref() {
                Some(c) => Some(validate::category(c)?),
                None => None,
            },
            province: validate::optional_province(req.province.as_deref())?,
            latitude: point.map(|p| p.latitude),
            longitude: point.map(|p| p.longitude),
            address: validate::optional_text("address", req.address.as_deref(), 500)?,
            image_keys,
        };

        let resubmit = !admin && attraction.status != ReviewStatus::Pending;
        let updated = self
            .attraction_repo
            .update(attraction_id, &update, resubmit)
            .await?;
        info!(
            attraction_id = %attraction_id,
            user_id = %ctx.user_id,
            resubmitted = resubmit,
            "Attraction updated"
        );
        Ok(updated)
    }

    /// Delete an attraction: admins always, submitters while it is pending.
    pub async fn delete(&self, ctx: &RequestContext, attraction_id: Uuid) -> AppResult<()> {
        let attraction = self.find(attraction_id).await?;
        let admin = self.rbac.has_permission(ctx.role, Permission::AttractionReview);
        if !admin {
            if attraction.submitted_by != ctx.user_id {
                return Err(AppError::authorization(
                    "Only the submitter can delete this attraction",
                ));
            }
            if attraction.status != ReviewStatus::Pending {
                return Err(AppError::conflict(
                    "Reviewed attractions can only be deleted by an admin",
                ));
            }
        }
        if !self.attraction_repo.delete(attraction_id).await? {
            return Err(AppError::not_found(format!("Attraction {attraction_id} not found")));
        }
        info!(attraction_id = %attraction_id, user_id = %ctx.user_id, "Attraction deleted");
        Ok(())
    }

    /// Approved attractions, for everyone.
    pub async fn list_public(
        &self,
        mut filter: AttractionFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Attraction>> {
        filter.status = Some(ReviewStatus::Approved);
        filter.submitted_by = None;
        self.attraction_repo.list(&filter, &page).await
    }

    /// Attractions in any status (admin).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: AttractionFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Attraction>> {
        self.rbac.require_permission(ctx.role, Permission::AttractionReview)?;
        self.attraction_repo.list(&filter, &page).await
    }

    /// An attraction; unapproved ones only for the submitter or an admin.
    pub async fn get(
        &self,
        ctx: Option<&RequestContext>,
        attraction_id: Uuid,
    ) -> AppResult<Attraction> {
        let attraction = self.find(attraction_id).await?;
        let visible = attraction.status == ReviewStatus::Approved
            || ctx.is_some_and(|c| c.is_self_or_admin(attraction.submitted_by));
        if !visible {
            return Err(AppError::not_found(format!("Attraction {attraction_id} not found")));
        }
        Ok(attraction)
    }

    /// Publish an attraction.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        attraction_id: Uuid,
    ) -> AppResult<Attraction> {
        self.rbac.require_permission(ctx.role, Permission::AttractionReview)?;
        let attraction = self.find(attraction_id).await?;
        if !attraction.status.can_approve() {
            return Err(AppError::conflict(format!(
                "Attraction is already {}",
                attraction.status
            )));
        }
        let approved = self
            .attraction_repo
            .review(attraction_id, attraction.status, ReviewStatus::Approved, ctx.user_id, None)
            .await?
            .ok_or_else(|| AppError::conflict("Attraction status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, attraction_id = %attraction_id, "Attraction approved");
        Ok(approved)
    }

    /// Reject a pending attraction.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        attraction_id: Uuid,
        reason: &str,
    ) -> AppResult<Attraction> {
        self.rbac.require_permission(ctx.role, Permission::AttractionReview)?;
        let reason = validate::reason(reason)?;
        let attraction = self.find(attraction_id).await?;
        if !attraction.status.can_reject() {
            return Err(AppError::conflict(format!(
                "Only pending attractions can be rejected; this one is {}",
                attraction.status
            )));
        }
        let rejected = self
            .attraction_repo
            .review(
                attraction_id,
                attraction.status,
                ReviewStatus::Rejected,
                ctx.user_id,
                Some(&reason),
            )
            .await?
            .ok_or_else(|| AppError::conflict("Attraction status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, attraction_id = %attraction_id, "Attraction rejected");
        Ok(rejected)
    }

    async fn find(&self, attraction_id: Uuid) -> AppResult<Attraction> {
        self.attraction_repo
            .find_by_id(attraction_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Attraction {attraction_id} not found")))
    }
}
