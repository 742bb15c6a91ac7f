//! Partner review.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::partner::Partner;

use crate::dto::query::ReviewQuery;
use crate::dto::request::{ApprovePartnerRequest, CommissionRequest, ReasonRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/partners
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ReviewQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Partner>>>> {
    let partners = state
        .partner_service
        .list(&auth, query.into_partner_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(partners)))
}

/// POST /api/admin/partners/{id}/approve
///
/// The body is optional; without one the default commission rate applies.
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Option<ValidatedJson<ApprovePartnerRequest>>,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    let req = body.map(|ValidatedJson(r)| r).unwrap_or_default();
    let partner = state
        .partner_service
        .approve(&auth, parse_uuid(&id)?, req.commission_bps)
        .await?;
    Ok(Json(ApiResponse::ok(partner)))
}

/// POST /api/admin/partners/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    let partner = state
        .partner_service
        .reject(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(partner)))
}

/// POST /api/admin/partners/{id}/suspend
pub async fn suspend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    let partner = state
        .partner_service
        .suspend(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(partner)))
}

/// PUT /api/admin/partners/{id}/commission
pub async fn set_commission(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CommissionRequest>,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    let partner = state
        .partner_service
        .set_commission(&auth, parse_uuid(&id)?, req.commission_bps)
        .await?;
    Ok(Json(ApiResponse::ok(partner)))
}
