//! Fee recording and commission reports.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::money::FeeSplit;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::fee_split::FeeSplitFilter;
use questhub_database::repositories::{FeeSplitRepository, PartnerRepository, ShopRepository};
use questhub_entity::fee_split::{CreateFeeSplit, FeeSplitSummary, FeeType, ShopFeeSplitRecord};
use questhub_entity::partner::Partner;
use questhub_entity::shop::Shop;

use crate::context::RequestContext;
use crate::validate;

/// A fee to record against a shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFeeRequest {
    /// Shop that paid.
    pub shop_id: Uuid,
    /// What the fee was for.
    pub fee_type: FeeType,
    /// Amount in satang.
    pub gross_amount: i64,
    /// Free-form note.
    pub note: Option<String>,
}

/// Build the split for a fee paid by `shop`.
///
/// The referring partner earns its current rate only while approved;
/// otherwise the platform keeps the whole fee.
pub(crate) fn split_fee(
    shop: &Shop,
    partner: Option<&Partner>,
    fee_type: FeeType,
    gross_amount: i64,
    note: Option<String>,
    recorded_by: Uuid,
) -> AppResult<CreateFeeSplit> {
    let earning = partner.filter(|p| p.is_approved() && Some(p.id) == shop.partner_id);
    let split = match earning {
        Some(p) => FeeSplit::compute(gross_amount, p.commission_bps)?,
        None => FeeSplit::platform_only(gross_amount)?,
    };
    Ok(CreateFeeSplit {
        shop_id: shop.id,
        partner_id: earning.map(|p| p.id),
        fee_type,
        gross_amount: split.gross_amount,
        platform_amount: split.platform_amount,
        partner_amount: split.partner_amount,
        commission_bps: split.commission_bps,
        note,
        recorded_by,
    })
}

/// Admin fee bookkeeping.
#[derive(Debug, Clone)]
pub struct CommissionService {
    fee_repo: Arc<FeeSplitRepository>,
    shop_repo: Arc<ShopRepository>,
    partner_repo: Arc<PartnerRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl CommissionService {
    /// Creates a new commission service.
    pub fn new(
        fee_repo: Arc<FeeSplitRepository>,
        shop_repo: Arc<ShopRepository>,
        partner_repo: Arc<PartnerRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            fee_repo,
            shop_repo,
            partner_repo,
            rbac,
        }
    }

    /// Record a fee and split it with the shop's partner at the current rate.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        req: RecordFeeRequest,
    ) -> AppResult<ShopFeeSplitRecord> {
        self.rbac.require_permission(ctx.role, Permission::FeeSplitManage)?;
        let shop = self
            .shop_repo
            .find_by_id(req.shop_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Shop {} not found", req.shop_id)))?;
        let partner = match shop.partner_id {
            Some(id) => self.partner_repo.find_by_id(id).await?,
            None => None,
        };
        let note = validate::optional_text("note", req.note.as_deref(), 500)?;
        let data = split_fee(
            &shop,
            partner.as_ref(),
            req.fee_type,
            req.gross_amount,
            note,
            ctx.user_id,
        )?;
        let record = self.fee_repo.create(&data).await?;
        info!(
            admin_id = %ctx.user_id,
            shop_id = %shop.id,
            fee_type = %record.fee_type,
            gross_amount = record.gross_amount,
            partner_amount = record.partner_amount,
            "Fee recorded"
        );
        Ok(record)
    }

    /// List fee records.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: FeeSplitFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<ShopFeeSplitRecord>> {
        self.rbac.require_permission(ctx.role, Permission::FeeSplitManage)?;
        self.fee_repo.list(&filter, &page).await
    }

    /// Totals over the matching records.
    pub async fn summary(
        &self,
        ctx: &RequestContext,
        filter: FeeSplitFilter,
    ) -> AppResult<FeeSplitSummary> {
        self.rbac.require_permission(ctx.role, Permission::FeeSplitManage)?;
        self.fee_repo.summary(&filter).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use questhub_entity::ReviewStatus;
    use questhub_entity::shop::ShopStatus;

    use super::*;

    fn shop(partner_id: Option<Uuid>) -> Shop {
        let now = Utc::now();
        Shop {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            partner_id,
            name: "Khao Soi Corner".to_string(),
            description: None,
            category: "food".to_string(),
            phone: None,
            address: None,
            province: "Chiang Mai".to_string(),
            latitude: None,
            longitude: None,
            image_keys: Vec::new(),
            status: ShopStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn partner(status: ReviewStatus, bps: i32) -> Partner {
        let now = Utc::now();
        Partner {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            full_name: "Somchai".to_string(),
            phone: "0812345678".to_string(),
            province: "Chiang Mai".to_string(),
            bank_name: None,
            bank_account_name: None,
            bank_account_number: None,
            referral_code: Some("ABCD2345".to_string()),
            status,
            commission_bps: bps,
            cooldown_until: None,
            last_assigned_at: None,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_split_with_approved_partner() {
        let p = partner(ReviewStatus::Approved, 2_000);
        let s = shop(Some(p.id));
        let fee =
            split_fee(&s, Some(&p), FeeType::Registration, 99_999, None, Uuid::nil()).unwrap();
        assert_eq!(fee.partner_id, Some(p.id));
        assert_eq!(fee.partner_amount, 19_999);
        assert_eq!(fee.platform_amount, 80_000);
        assert_eq!(fee.commission_bps, 2_000);
    }

    #[test]
    fn test_split_without_partner_goes_to_platform() {
        let s = shop(None);
        let fee = split_fee(&s, None, FeeType::Subscription, 50_000, None, Uuid::nil()).unwrap();
        assert_eq!(fee.partner_id, None);
        assert_eq!(fee.partner_amount, 0);
        assert_eq!(fee.platform_amount, 50_000);
    }

    #[test]
    fn test_suspended_partner_earns_nothing() {
        let p = partner(ReviewStatus::Suspended, 2_000);
        let s = shop(Some(p.id));
        let fee = split_fee(&s, Some(&p), FeeType::Promotion, 10_000, None, Uuid::nil()).unwrap();
        assert_eq!(fee.partner_id, None);
        assert_eq!(fee.platform_amount, 10_000);
    }

    #[test]
    fn test_non_positive_fee_rejected() {
        let s = shop(None);
        assert!(split_fee(&s, None, FeeType::Other, 0, None, Uuid::nil()).is_err());
    }
}
