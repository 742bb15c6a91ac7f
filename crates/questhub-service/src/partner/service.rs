//! Partner applications, admin review and partner dashboards.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;
use questhub_core::types::money::FULL_BPS;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::attraction::AttractionFilter;
use questhub_database::repositories::fee_split::FeeSplitFilter;
use questhub_database::repositories::partner::{PartnerFilter, PartnerProfileUpdate};
use questhub_database::repositories::shop::ShopFilter;
use questhub_database::repositories::shop_request::ShopRequestFilter;
use questhub_database::repositories::{
    AttractionRepository, FeeSplitRepository, PartnerRepository, ShopRepository,
    ShopRequestRepository,
};
use questhub_entity::ReviewStatus;
use questhub_entity::attraction::Attraction;
use questhub_entity::fee_split::{FeeSplitSummary, ShopFeeSplitRecord};
use questhub_entity::partner::{CreatePartner, Partner};
use questhub_entity::shop::Shop;
use questhub_entity::shop_request::{ShopRequest, ShopRequestStatus};
use questhub_entity::user::UserRole;

use super::referral;
use crate::context::RequestContext;
use crate::validate;

/// Attempts at issuing a unique referral code on approval.
const REFERRAL_CODE_ATTEMPTS: usize = 5;

/// A partner application as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerApplication {
    /// Legal name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Province to work in.
    pub province: String,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Account holder.
    pub bank_account_name: Option<String>,
    /// Account number.
    pub bank_account_number: Option<String>,
}

/// Commission records with totals.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerDashboard {
    /// Totals over every record for the partner.
    pub summary: FeeSplitSummary,
    /// One page of records, newest first.
    pub records: PageResponse<ShopFeeSplitRecord>,
}

/// Partner lifecycle and dashboard queries.
#[derive(Debug, Clone)]
pub struct PartnerService {
    partner_repo: Arc<PartnerRepository>,
    shop_repo: Arc<ShopRepository>,
    request_repo: Arc<ShopRequestRepository>,
    fee_repo: Arc<FeeSplitRepository>,
    attraction_repo: Arc<AttractionRepository>,
    rbac: Arc<RbacEnforcer>,
    default_commission_bps: i32,
}

impl PartnerService {
    /// Creates a new partner service.
    pub fn new(
        partner_repo: Arc<PartnerRepository>,
        shop_repo: Arc<ShopRepository>,
        request_repo: Arc<ShopRequestRepository>,
        fee_repo: Arc<FeeSplitRepository>,
        attraction_repo: Arc<AttractionRepository>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            partner_repo,
            shop_repo,
            request_repo,
            fee_repo,
            attraction_repo,
            rbac,
            default_commission_bps: config.default_commission_bps.clamp(0, FULL_BPS),
        }
    }

    /// File a partner application for the caller.
    pub async fn apply(&self, ctx: &RequestContext, req: PartnerApplication) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::PartnerApply)?;
        if ctx.role != UserRole::User {
            return Err(AppError::authorization(
                "Only consumer accounts can apply to become a partner",
            ));
        }

        let data = CreatePartner {
            user_id: ctx.user_id,
            full_name: validate::text("full_name", &req.full_name, 2, 200)?,
            phone: validate::phone(&req.phone)?,
            province: validate::province(&req.province)?,
            bank_name: validate::optional_text("bank_name", req.bank_name.as_deref(), 100)?,
            bank_account_name: validate::optional_text(
                "bank_account_name",
                req.bank_account_name.as_deref(),
                200,
            )?,
            bank_account_number: bank_account(req.bank_account_number.as_deref())?,
        };

        let partner = self
            .partner_repo
            .create(&data, self.default_commission_bps)
            .await?;
        info!(
            partner_id = %partner.id,
            user_id = %ctx.user_id,
            province = %partner.province,
            "Partner application filed"
        );
        Ok(partner)
    }

    /// The caller's partner profile, in any status.
    pub async fn get_own(&self, ctx: &RequestContext) -> AppResult<Partner> {
        self.partner_repo
            .find_by_user_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("You have not applied to become a partner"))
    }

    /// Update the caller's contact and bank details.
    pub async fn update_own(
        &self,
        ctx: &RequestContext,
        update: PartnerProfileUpdate,
    ) -> AppResult<Partner> {
        let partner = self.get_own(ctx).await?;
        let update = PartnerProfileUpdate {
            full_name: match update.full_name.as_deref() {
                Some(name) => Some(validate::text("full_name", name, 2, 200)?),
                None => None,
            },
            phone: match update.phone.as_deref() {
                Some(phone) => Some(validate::phone(phone)?),
                None => None,
            },
            bank_name: validate::optional_text("bank_name", update.bank_name.as_deref(), 100)?,
            bank_account_name: validate::optional_text(
                "bank_account_name",
                update.bank_account_name.as_deref(),
                200,
            )?,
            bank_account_number: bank_account(update.bank_account_number.as_deref())?,
        };
        self.partner_repo.update_profile(partner.id, &update).await
    }

    /// The caller's partner profile, which must be approved.
    pub async fn approved_partner_for(&self, ctx: &RequestContext) -> AppResult<Partner> {
        let partner = self.get_own(ctx).await?;
        if !partner.is_approved() {
            return Err(AppError::authorization(format!(
                "Partner account is {}",
                partner.status
            )));
        }
        Ok(partner)
    }

    /// Shop requests assigned to the caller.
    pub async fn my_shop_requests(
        &self,
        ctx: &RequestContext,
        status: Option<ShopRequestStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<ShopRequest>> {
        self.rbac.require_permission(ctx.role, Permission::ShopRequestHandle)?;
        let partner = self.approved_partner_for(ctx).await?;
        let filter = ShopRequestFilter {
            status,
            assigned_partner_id: Some(partner.id),
            ..Default::default()
        };
        self.request_repo.list(&filter, &page).await
    }

    /// Shops referred by the caller.
    pub async fn my_shops(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Shop>> {
        let partner = self.get_own(ctx).await?;
        let filter = ShopFilter {
            partner_id: Some(partner.id),
            ..Default::default()
        };
        self.shop_repo.list(&filter, &page).await
    }

    /// The caller's commission records and totals.
    pub async fn my_commissions(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PartnerDashboard> {
        self.rbac.require_permission(ctx.role, Permission::CommissionViewOwn)?;
        let partner = self.get_own(ctx).await?;
        let filter = FeeSplitFilter {
            partner_id: Some(partner.id),
            ..Default::default()
        };
        let summary = self.fee_repo.summary(&filter).await?;
        let records = self.fee_repo.list(&filter, &page).await?;
        Ok(PartnerDashboard { summary, records })
    }

    /// Attractions the caller submitted.
    pub async fn my_attractions(
        &self,
        ctx: &RequestContext,
        status: Option<ReviewStatus>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Attraction>> {
        self.rbac.require_permission(ctx.role, Permission::AttractionSubmit)?;
        let filter = AttractionFilter {
            status,
            submitted_by: Some(ctx.user_id),
            ..Default::default()
        };
        self.attraction_repo.list(&filter, &page).await
    }

    /// List partners (admin).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: PartnerFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Partner>> {
        self.rbac.require_permission(ctx.role, Permission::PartnerReview)?;
        self.partner_repo.list(&filter, &page).await
    }

    /// Approve an application, issue a referral code and promote the owner.
    pub async fn approve(
        &self,
        ctx: &RequestContext,
        partner_id: Uuid,
        commission_bps: Option<i32>,
    ) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::PartnerReview)?;
        let partner = self.find(partner_id).await?;
        if !partner.status.can_approve() {
            return Err(AppError::conflict(format!(
                "Partner is already {}",
                partner.status
            )));
        }
        let bps = match commission_bps {
            Some(bps) => commission(bps)?,
            None => partner.commission_bps,
        };

        for attempt in 1..=REFERRAL_CODE_ATTEMPTS {
            let code = referral::generate();
            match self
                .partner_repo
                .approve(partner_id, partner.status, ctx.user_id, &code, bps)
                .await
            {
                Ok(Some(approved)) => {
                    info!(
                        admin_id = %ctx.user_id,
                        partner_id = %partner_id,
                        commission_bps = bps,
                        "Partner approved"
                    );
                    return Ok(approved);
                }
                Ok(None) => {
                    return Err(AppError::conflict("Partner status changed, reload and retry"));
                }
                Err(e) if e.kind == ErrorKind::Conflict && attempt < REFERRAL_CODE_ATTEMPTS => {
                    warn!(partner_id = %partner_id, attempt, "Referral code collision");
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::conflict("Could not issue a referral code, retry approval"))
    }

    /// Reject a pending application.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        partner_id: Uuid,
        reason: &str,
    ) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::PartnerReview)?;
        let reason = validate::reason(reason)?;
        let partner = self.find(partner_id).await?;
        if !partner.status.can_reject() {
            return Err(AppError::conflict(format!(
                "Only pending applications can be rejected; this one is {}",
                partner.status
            )));
        }
        let rejected = self
            .partner_repo
            .reject(partner_id, partner.status, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Partner status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, partner_id = %partner_id, "Partner rejected");
        Ok(rejected)
    }

    /// Suspend an approved partner and demote the owner.
    pub async fn suspend(
        &self,
        ctx: &RequestContext,
        partner_id: Uuid,
        reason: &str,
    ) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::PartnerReview)?;
        let reason = validate::reason(reason)?;
        let partner = self.find(partner_id).await?;
        if !partner.status.can_suspend() {
            return Err(AppError::conflict(format!(
                "Only approved partners can be suspended; this one is {}",
                partner.status
            )));
        }
        let suspended = self
            .partner_repo
            .suspend(partner_id, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Partner status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, partner_id = %partner_id, "Partner suspended");
        Ok(suspended)
    }

    /// Change a partner's commission rate.
    pub async fn set_commission(
        &self,
        ctx: &RequestContext,
        partner_id: Uuid,
        commission_bps: i32,
    ) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::PartnerReview)?;
        let bps = commission(commission_bps)?;
        let partner = self.partner_repo.set_commission(partner_id, bps).await?;
        info!(
            admin_id = %ctx.user_id,
            partner_id = %partner_id,
            commission_bps = bps,
            "Commission rate changed"
        );
        Ok(partner)
    }

    async fn find(&self, partner_id: Uuid) -> AppResult<Partner> {
        self.partner_repo
            .find_by_id(partner_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Partner {partner_id} not found")))
    }
}

/// Resolve an optional referral code to an approved partner.
///
/// A blank code means no referrer; an unknown or unapproved one is a
/// validation error.
pub(crate) async fn resolve_referral(
    repo: &PartnerRepository,
    code: Option<&str>,
) -> AppResult<Option<Partner>> {
    let Some(code) = code.map(referral::normalize).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    match repo.find_by_referral_code(&code).await? {
        Some(partner) if partner.is_approved() => Ok(Some(partner)),
        _ => Err(AppError::validation(format!("Unknown referral code '{code}'"))),
    }
}

pub(crate) fn commission(bps: i32) -> AppResult<i32> {
    if !(0..=FULL_BPS).contains(&bps) {
        return Err(AppError::validation(
            "commission_bps must be between 0 and 10000",
        ));
    }
    Ok(bps)
}

fn bank_account(value: Option<&str>) -> AppResult<Option<String>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let digits: String = raw.chars().filter(|c| !matches!(c, '-' | ' ')).collect();
    if !(6..=20).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::validation("Bank account number must be 6 to 20 digits"));
    }
    Ok(Some(digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_bounds() {
        assert_eq!(commission(0).unwrap(), 0);
        assert_eq!(commission(10_000).unwrap(), 10_000);
        assert!(commission(-1).is_err());
        assert!(commission(10_001).is_err());
    }

    #[test]
    fn test_bank_account_normalised() {
        assert_eq!(bank_account(Some("123-4-56789-0")).unwrap(), Some("1234567890".to_string()));
        assert_eq!(bank_account(Some("  ")).unwrap(), None);
        assert!(bank_account(Some("12ab5678")).is_err());
        assert!(bank_account(Some("123")).is_err());
    }
}
