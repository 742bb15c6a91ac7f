//! Shop request oversight.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::shop_request::ShopRequest;

use crate::dto::query::ReviewQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/shop-requests
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ReviewQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ShopRequest>>>> {
    let requests = state
        .shop_request_service
        .list(&auth, query.into_shop_request_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(requests)))
}

/// POST /api/admin/shop-requests/{id}/reassign
pub async fn reassign(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state
        .shop_request_service
        .reassign(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// POST /api/admin/shop-requests/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state
        .shop_request_service
        .cancel(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}
