//! Shop directory and owner handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use questhub_core::types::PageResponse;
use questhub_entity::shop::Shop;

use crate::dto::query::ShopQuery;
use crate::dto::request::{RegisterShopRequest, UpdateShopRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{
    ApiQuery, AuthUser, MaybeAuthUser, PaginationParams, ValidatedJson, parse_uuid,
};
use crate::state::AppState;

/// GET /api/shops
pub async fn list_public(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ShopQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Shop>>>> {
    let shops = state
        .shop_service
        .list_public(query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(shops)))
}

/// POST /api/shops
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RegisterShopRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Shop>>)> {
    let shop = state.shop_service.register(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(shop))))
}

/// GET /api/shops/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Shop>>>> {
    let shops = state
        .shop_service
        .list_mine(&auth, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(shops)))
}

/// GET /api/shops/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Shop>>> {
    let shop = state.shop_service.get(auth.ctx(), parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(shop)))
}

/// PUT /api/shops/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateShopRequest>,
) -> ApiResult<Json<ApiResponse<Shop>>> {
    let shop = state
        .shop_service
        .update(&auth, parse_uuid(&id)?, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(shop)))
}
