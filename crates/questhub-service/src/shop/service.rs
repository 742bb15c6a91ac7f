//! Shop lifecycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::shop::ShopFilter;
use questhub_database::repositories::{MediaRepository, PartnerRepository, ShopRepository};
use questhub_entity::fee_split::{FeeType, ShopFeeSplitRecord};
use questhub_entity::shop::{CreateShop, Shop, ShopStatus, UpdateShop};

use crate::commission::service::split_fee;
use crate::context::RequestContext;
use crate::partner::service::resolve_referral;
use crate::validate;

/// A shop registration as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopRegistration {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Business category, e.g. `food`.
    pub category: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Province.
    pub province: String,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Keys of images the caller uploaded.
    #[serde(default)]
    pub image_keys: Vec<String>,
    /// Code of the partner who referred the shop.
    pub referral_code: Option<String>,
}

/// Editable shop fields; `None` keeps the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_keys: Option<Vec<String>>,
}

/// Shop registration, visibility and review.
#[derive(Debug, Clone)]
pub struct ShopService {
    shop_repo: Arc<ShopRepository>,
    partner_repo: Arc<PartnerRepository>,
    media_repo: Arc<MediaRepository>,
    rbac: Arc<RbacEnforcer>,
    max_images: usize,
}

impl ShopService {
    /// Creates a new shop service.
    pub fn new(
        shop_repo: Arc<ShopRepository>,
        partner_repo: Arc<PartnerRepository>,
        media_repo: Arc<MediaRepository>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            shop_repo,
            partner_repo,
            media_repo,
            rbac,
            max_images: config.max_images_per_entity,
        }
    }

    /// Register a shop for the caller; it waits for admin review.
    pub async fn register(&self, ctx: &RequestContext, req: ShopRegistration) -> AppResult<Shop> {
        self.rbac.require_permission(ctx.role, Permission::ShopRegister)?;

        let partner = resolve_referral(&self.partner_repo, req.referral_code.as_deref()).await?;
        let point = validate::coordinates(req.latitude, req.longitude)?;
        let image_keys = validate::image_keys(req.image_keys, self.max_images)?;
        validate::keys_owned(&self.media_repo, ctx.user_id, &image_keys).await?;

        let data = CreateShop {
            owner_id: ctx.user_id,
            partner_id: partner.as_ref().map(|p| p.id),
            name: validate::text("name", &req.name, 2, 200)?,
            description: validate::optional_text("description", req.description.as_deref(), 4000)?,
            category: validate::category(&req.category)?,
            phone: match req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                Some(phone) => Some(validate::phone(phone)?),
                None => None,
            },
            address: validate::optional_text("address", req.address.as_deref(), 500)?,
            province: validate::province(&req.province)?,
            latitude: point.map(|p| p.latitude),
            longitude: point.map(|p| p.longitude),
            image_keys,
        };

        let shop = self.shop_repo.create(&data).await?;
        info!(
            shop_id = %shop.id,
            owner_id = %ctx.user_id,
            partner_id = ?shop.partner_id,
            "Shop registered"
        );
        Ok(shop)
    }

    /// Active shops, for everyone.
    pub async fn list_public(
        &self,
        mut filter: ShopFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Shop>> {
        filter.status = Some(ShopStatus::Active);
        filter.owner_id = None;
        filter.partner_id = None;
        self.shop_repo.list(&filter, &page).await
    }

    /// Shops the caller owns.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Shop>> {
        let filter = ShopFilter {
            owner_id: Some(ctx.user_id),
            ..Default::default()
        };
        self.shop_repo.list(&filter, &page).await
    }

    /// A shop; inactive ones only for the owner, referring partner or admin.
    pub async fn get(&self, ctx: Option<&RequestContext>, shop_id: Uuid) -> AppResult<Shop> {
        let shop = self.find(shop_id).await?;
        if shop.is_active() {
            return Ok(shop);
        }
        if let Some(ctx) = ctx {
            if ctx.is_self_or_admin(shop.owner_id) {
                return Ok(shop);
            }
            if let Some(partner_id) = shop.partner_id {
                let partner = self.partner_repo.find_by_user_id(ctx.user_id).await?;
                if partner.is_some_and(|p| p.id == partner_id) {
                    return Ok(shop);
                }
            }
        }
        Err(AppError::not_found(format!("Shop {shop_id} not found")))
    }

    /// Edit a shop. An owner editing a rejected shop sends it back to review.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        shop_id: Uuid,
        req: ShopUpdate,
    ) -> AppResult<Shop> {
        let shop = self.find(shop_id).await?;
        if !ctx.is_self_or_admin(shop.owner_id) {
            return Err(AppError::authorization("Only the owner can edit this shop"));
        }

        let point = validate::coordinates(req.latitude, req.longitude)?;
        let image_keys = match req.image_keys {
            Some(keys) => {
                let keys = validate::image_keys(keys, self.max_images)?;
                validate::keys_owned(&self.media_repo, shop.owner_id, &keys).await?;
                Some(keys)
            }
            None => None,
        };
        let update = UpdateShop {
            name: match req.name.as_deref() {
                Some(name) => Some(validate::text("name", name, 2, 200)?),
                None => None,
            },
            description: validate::optional_text("description", req.description.as_deref(), 4000)?,
            category: match req.category.as_deref() {
                Some(c) => Some(validate::category(c)?),
                None => None,
            },
            phone: match req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                Some(phone) => Some(validate::phone(phone)?),
                None => None,
            },
            address: validate::optional_text("address", req.address.as_deref(), 500)?,
            province: validate::optional_province(req.province.as_deref())?,
            latitude: point.map(|p| p.latitude),
            longitude: point.map(|p| p.longitude),
            image_keys,
        };

        let resubmit = shop.owner_id == ctx.user_id && shop.status == ShopStatus::Rejected;
        let updated = self.shop_repo.update(shop_id, &update, resubmit).await?;
        info!(shop_id = %shop_id, user_id = %ctx.user_id, resubmitted = resubmit, "Shop updated");
        Ok(updated)
    }

    /// List shops in any status (admin).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ShopFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Shop>> {
        self.rbac.require_permission(ctx.role, Permission::ShopReview)?;
        self.shop_repo.list(&filter, &page).await
    }

    /// Activate a shop and promote its owner, recording a registration fee
    /// when one is charged.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        shop_id: Uuid,
        registration_fee: Option<i64>,
    ) -> AppResult<(Shop, Option<ShopFeeSplitRecord>)> {
        self.rbac.require_permission(ctx.role, Permission::ShopReview)?;
        let shop = self.find(shop_id).await?;
        if !shop.status.can_approve() {
            return Err(AppError::conflict(format!(
                "Shop is {} and cannot be approved",
                shop.status
            )));
        }

        let fee = match registration_fee {
            Some(gross) if gross < 0 => {
                return Err(AppError::validation("registration_fee cannot be negative"));
            }
            Some(gross) if gross > 0 => {
                let partner = match shop.partner_id {
                    Some(id) => self.partner_repo.find_by_id(id).await?,
                    None => None,
                };
                Some(split_fee(
                    &shop,
                    partner.as_ref(),
                    FeeType::Registration,
                    gross,
                    None,
                    ctx.user_id,
                )?)
            }
            _ => None,
        };

        let (shop, record) = self
            .shop_repo
            .approve(shop_id, shop.status, ctx.user_id, fee.as_ref())
            .await?
            .ok_or_else(|| AppError::conflict("Shop status changed, reload and retry"))?;
        info!(
            admin_id = %ctx.user_id,
            shop_id = %shop_id,
            registration_fee = ?record.as_ref().map(|r| r.gross_amount),
            "Shop approved"
        );
        Ok((shop, record))
    }

    /// Reject a pending shop.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        shop_id: Uuid,
        reason: &str,
    ) -> AppResult<Shop> {
        self.review(ctx, shop_id, ShopStatus::Pending, ShopStatus::Rejected, reason)
            .await
    }

    /// Suspend an active shop.
    pub async fn suspend(
        &self,
        ctx: &RequestContext,
        shop_id: Uuid,
        reason: &str,
    ) -> AppResult<Shop> {
        self.review(ctx, shop_id, ShopStatus::Active, ShopStatus::Suspended, reason)
            .await
    }

    async fn review(
        &self,
        ctx: &RequestContext,
        shop_id: Uuid,
        from: ShopStatus,
        to: ShopStatus,
        reason: &str,
    ) -> AppResult<Shop> {
        self.rbac.require_permission(ctx.role, Permission::ShopReview)?;
        let reason = validate::reason(reason)?;
        let shop = self.find(shop_id).await?;
        if shop.status != from {
            return Err(AppError::conflict(format!(
                "Shop is {}; only {from} shops can become {to}",
                shop.status
            )));
        }
        let shop = self
            .shop_repo
            .set_review_status(shop_id, from, to, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Shop status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, shop_id = %shop_id, status = %to, "Shop reviewed");
        Ok(shop)
    }

    async fn find(&self, shop_id: Uuid) -> AppResult<Shop> {
        self.shop_repo
            .find_by_id(shop_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Shop {shop_id} not found")))
    }
}
