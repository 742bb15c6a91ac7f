//! Shop request intake, partner actions, admin overrides and the sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::shop_request::{AssignmentOutcome, ShopRequestFilter};
use questhub_database::repositories::{PartnerRepository, ShopRepository, ShopRequestRepository};
use questhub_entity::partner::Partner;
use questhub_entity::shop_request::{
    AssignmentGuard, CreateShopRequest, ShopRequest, ShopRequestStatus,
};

use crate::context::RequestContext;
use crate::partner::assignment::{random_index, select_partner};
use crate::validate;

/// Requests handled per sweep pass and category.
const SWEEP_BATCH: i64 = 200;

/// A shop signup request as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRequestSubmission {
    /// Name of the shop to sign up.
    pub shop_name: String,
    /// Person to contact.
    pub contact_name: String,
    /// Contact phone.
    pub phone: String,
    /// Province the shop is in.
    pub province: String,
    /// Free-form details.
    pub details: Option<String>,
}

/// Counts from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pending requests that received a partner.
    pub assigned: u32,
    /// Timed-out requests handed to another partner.
    pub reassigned: u32,
    /// Requests still waiting because no partner is approved.
    pub still_pending: u32,
    /// Requests that failed to process.
    pub failed: u32,
}

/// Shop request workflow.
#[derive(Debug, Clone)]
pub struct ShopRequestService {
    request_repo: Arc<ShopRequestRepository>,
    partner_repo: Arc<PartnerRepository>,
    shop_repo: Arc<ShopRepository>,
    rbac: Arc<RbacEnforcer>,
    cooldown: Duration,
    assignment_timeout: Duration,
}

impl ShopRequestService {
    /// Creates a new shop request service.
    pub fn new(
        request_repo: Arc<ShopRequestRepository>,
        partner_repo: Arc<PartnerRepository>,
        shop_repo: Arc<ShopRepository>,
        rbac: Arc<RbacEnforcer>,
        config: &MarketplaceConfig,
    ) -> Self {
        Self {
            request_repo,
            partner_repo,
            shop_repo,
            rbac,
            cooldown: Duration::hours(config.cooldown_hours as i64),
            assignment_timeout: Duration::hours(config.assignment_timeout_hours as i64),
        }
    }

    /// Store a request and hand it to a partner.
    ///
    /// Anonymous callers are allowed. A failed assignment pass leaves the
    /// request pending for the sweep instead of failing the submission.
    pub async fn submit(
        &self,
        ctx: Option<&RequestContext>,
        req: ShopRequestSubmission,
    ) -> AppResult<ShopRequest> {
        let data = CreateShopRequest {
            shop_name: validate::text("shop_name", &req.shop_name, 2, 200)?,
            contact_name: validate::text("contact_name", &req.contact_name, 2, 200)?,
            phone: validate::phone(&req.phone)?,
            province: validate::province(&req.province)?,
            details: validate::optional_text("details", req.details.as_deref(), 2000)?,
            requested_by: ctx.map(|c| c.user_id),
        };
        let request = self.request_repo.create(&data).await?;
        info!(request_id = %request.id, province = %request.province, "Shop request submitted");

        match self.assign(request.id, AssignmentGuard::Unassigned).await {
            Ok(outcome) => Ok(outcome.request),
            // The sweep got to it first.
            Err(e) if e.kind == ErrorKind::Conflict => self.find(request.id).await,
            Err(e) => {
                warn!(
                    request_id = %request.id,
                    error = %e,
                    "Initial assignment failed, left pending"
                );
                Ok(request)
            }
        }
    }

    /// A request visible to its holder, its submitter or an admin.
    pub async fn get(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ShopRequest> {
        let request = self.find(request_id).await?;
        if ctx.is_admin() || request.requested_by == Some(ctx.user_id) {
            return Ok(request);
        }
        if let Some(partner) = self.partner_repo.find_by_user_id(ctx.user_id).await? {
            if request.is_assigned_to(partner.id) {
                return Ok(request);
            }
        }
        Err(AppError::not_found(format!("Shop request {request_id} not found")))
    }

    /// The assigned partner takes the request on.
    pub async fn accept(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ShopRequest> {
        let partner = self.holder(ctx, request_id).await?;
        let request = self
            .request_repo
            .accept(request_id, partner.id)
            .await?
            .ok_or_else(|| AppError::conflict("Only an assigned request can be accepted"))?;
        info!(request_id = %request_id, partner_id = %partner.id, "Shop request accepted");
        Ok(request)
    }

    /// The assigned partner passes; the request moves on immediately.
    pub async fn decline(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ShopRequest> {
        let partner = self.holder(ctx, request_id).await?;
        let request = self.find(request_id).await?;
        if request.status != ShopRequestStatus::Assigned {
            return Err(AppError::conflict(format!(
                "Only an assigned request can be declined; this one is {}",
                request.status
            )));
        }
        let outcome = self.assign(request_id, AssignmentGuard::HeldBy(partner.id)).await?;
        info!(
            request_id = %request_id,
            declined_by = %partner.id,
            next_partner = ?outcome.partner.as_ref().map(|p| p.id),
            "Shop request declined"
        );
        Ok(outcome.request)
    }

    /// Close an accepted request with the shop it produced.
    pub async fn complete(
        &self,
        ctx: &RequestContext,
        request_id: Uuid,
        shop_id: Uuid,
    ) -> AppResult<ShopRequest> {
        let partner = self.holder(ctx, request_id).await?;
        if self.shop_repo.find_by_id(shop_id).await?.is_none() {
            return Err(AppError::validation(format!("Shop {shop_id} does not exist")));
        }
        let request = self
            .request_repo
            .complete(request_id, partner.id, shop_id)
            .await?
            .ok_or_else(|| AppError::conflict("Only an accepted request can be completed"))?;
        info!(
            request_id = %request_id,
            partner_id = %partner.id,
            shop_id = %shop_id,
            "Shop request completed"
        );
        Ok(request)
    }

    /// List requests (admin).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ShopRequestFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<ShopRequest>> {
        self.rbac.require_permission(ctx.role, Permission::ShopRequestManage)?;
        self.request_repo.list(&filter, &page).await
    }

    /// Force the request onto another partner (admin).
    pub async fn reassign(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ShopRequest> {
        self.rbac.require_permission(ctx.role, Permission::ShopRequestManage)?;
        let outcome = self.assign(request_id, AssignmentGuard::Open).await?;
        info!(
            admin_id = %ctx.user_id,
            request_id = %request_id,
            partner_id = ?outcome.partner.as_ref().map(|p| p.id),
            "Shop request reassigned"
        );
        Ok(outcome.request)
    }

    /// Cancel a request that is not yet finished (admin).
    pub async fn cancel(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<ShopRequest> {
        self.rbac.require_permission(ctx.role, Permission::ShopRequestManage)?;
        let request = self
            .request_repo
            .cancel(request_id)
            .await?
            .ok_or_else(|| AppError::conflict("Request is already completed or cancelled"))?;
        info!(admin_id = %ctx.user_id, request_id = %request_id, "Shop request cancelled");
        Ok(request)
    }

    /// Retry pending requests and reassign timed-out ones.
    pub async fn sweep(&self) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        for id in self.request_repo.find_unassigned(SWEEP_BATCH).await? {
            match self.assign(id, AssignmentGuard::Unassigned).await {
                Ok(outcome) if outcome.partner.is_some() => report.assigned += 1,
                Ok(_) => report.still_pending += 1,
                Err(e) if e.kind == ErrorKind::Conflict => {}
                Err(e) => {
                    warn!(request_id = %id, error = %e, "Assignment retry failed");
                    report.failed += 1;
                }
            }
        }

        let cutoff = Utc::now() - self.assignment_timeout;
        for id in self.request_repo.find_stale_assigned(cutoff, SWEEP_BATCH).await? {
            match self.assign(id, AssignmentGuard::TimedOut(cutoff)).await {
                Ok(outcome) if outcome.partner.is_some() => report.reassigned += 1,
                Ok(_) => report.still_pending += 1,
                Err(e) if e.kind == ErrorKind::Conflict => {}
                Err(e) => {
                    warn!(request_id = %id, error = %e, "Timed-out reassignment failed");
                    report.failed += 1;
                }
            }
        }

        if report != SweepReport::default() {
            info!(
                assigned = report.assigned,
                reassigned = report.reassigned,
                still_pending = report.still_pending,
                failed = report.failed,
                "Assignment sweep finished"
            );
        }
        Ok(report)
    }

    async fn assign(
        &self,
        request_id: Uuid,
        guard: AssignmentGuard,
    ) -> AppResult<AssignmentOutcome> {
        let outcome = self
            .request_repo
            .assign_with(request_id, guard, self.cooldown, |request, partners, now| {
                select_partner(request, partners, now, random_index)
            })
            .await?;
        match &outcome.partner {
            Some(partner) => info!(
                request_id = %request_id,
                partner_id = %partner.id,
                round_size = outcome.request.tried_partner_ids.len(),
                "Shop request assigned"
            ),
            None => warn!(
                request_id = %request_id,
                "No approved partner available, request left pending"
            ),
        }
        Ok(outcome)
    }

    /// The caller's approved partner row, which must hold the request.
    async fn holder(&self, ctx: &RequestContext, request_id: Uuid) -> AppResult<Partner> {
        self.rbac.require_permission(ctx.role, Permission::ShopRequestHandle)?;
        let partner = self
            .partner_repo
            .find_by_user_id(ctx.user_id)
            .await?
            .filter(Partner::is_approved)
            .ok_or_else(|| AppError::authorization("An approved partner account is required"))?;
        let request = self.find(request_id).await?;
        if !request.is_assigned_to(partner.id) {
            return Err(AppError::authorization("This request is not assigned to you"));
        }
        Ok(partner)
    }

    async fn find(&self, request_id: Uuid) -> AppResult<ShopRequest> {
        self.request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Shop request {request_id} not found")))
    }
}
