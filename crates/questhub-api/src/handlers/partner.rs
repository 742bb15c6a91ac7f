//! Partner self-service handlers and dashboards.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::attraction::Attraction;
use questhub_entity::partner::Partner;
use questhub_entity::shop::Shop;
use questhub_entity::shop_request::ShopRequest;
use questhub_service::PartnerDashboard;

use crate::dto::query::StatusQuery;
use crate::dto::request::{PartnerApplyRequest, PartnerUpdateRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_optional};
use crate::state::AppState;

/// POST /api/partners/apply
pub async fn apply(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<PartnerApplyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Partner>>)> {
    let partner = state.partner_service.apply(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(partner))))
}

/// GET /api/partners/me
pub async fn get_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    Ok(Json(ApiResponse::ok(state.partner_service.get_own(&auth).await?)))
}

/// PUT /api/partners/me
pub async fn update_own(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<PartnerUpdateRequest>,
) -> ApiResult<Json<ApiResponse<Partner>>> {
    let partner = state.partner_service.update_own(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(partner)))
}

/// GET /api/partners/me/shop-requests
pub async fn my_shop_requests(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<StatusQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ShopRequest>>>> {
    let status = parse_optional(query.status.as_deref())?;
    let requests = state
        .partner_service
        .my_shop_requests(&auth, status, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(requests)))
}

/// GET /api/partners/me/shops
pub async fn my_shops(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Shop>>>> {
    let shops = state
        .partner_service
        .my_shops(&auth, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(shops)))
}

/// GET /api/partners/me/commissions
pub async fn my_commissions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PartnerDashboard>>> {
    let dashboard = state
        .partner_service
        .my_commissions(&auth, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(dashboard)))
}

/// GET /api/partners/me/attractions
pub async fn my_attractions(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<StatusQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Attraction>>>> {
    let status = parse_optional(query.status.as_deref())?;
    let attractions = state
        .partner_service
        .my_attractions(&auth, status, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(attractions)))
}
