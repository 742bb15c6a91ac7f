//! Shop review.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::shop::Shop;

use crate::dto::query::ShopQuery;
use crate::dto::request::{ApproveShopRequest, ReasonRequest};
use crate::dto::response::{ApiResponse, ShopApprovalResponse};
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/shops
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ShopQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Shop>>>> {
    let shops = state
        .shop_service
        .list(&auth, query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(shops)))
}

/// POST /api/admin/shops/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Option<ValidatedJson<ApproveShopRequest>>,
) -> ApiResult<Json<ApiResponse<ShopApprovalResponse>>> {
    let req = body.map(|ValidatedJson(r)| r).unwrap_or_default();
    let (shop, fee_split) = state
        .shop_service
        .approve(&auth, parse_uuid(&id)?, req.registration_fee)
        .await?;
    Ok(Json(ApiResponse::ok(ShopApprovalResponse { shop, fee_split })))
}

/// POST /api/admin/shops/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Shop>>> {
    let shop = state
        .shop_service
        .reject(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(shop)))
}

/// POST /api/admin/shops/{id}/suspend
pub async fn suspend(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReasonRequest>,
) -> ApiResult<Json<ApiResponse<Shop>>> {
    let shop = state
        .shop_service
        .suspend(&auth, parse_uuid(&id)?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(shop)))
}
