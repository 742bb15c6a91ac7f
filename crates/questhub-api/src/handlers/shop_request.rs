//! Shop signup requests: public submission and the assigned partner's actions.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use questhub_entity::shop_request::ShopRequest;

use crate::dto::request::{CompleteShopRequest, SubmitShopRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, MaybeAuthUser, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// POST /api/shop-requests
///
/// Open to anonymous clients; a signed-in caller is recorded as requester.
pub async fn submit(
    State(state): State<AppState>,
    auth: MaybeAuthUser,
    ValidatedJson(req): ValidatedJson<SubmitShopRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ShopRequest>>)> {
    let request = state
        .shop_request_service
        .submit(auth.ctx(), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(request))))
}

/// GET /api/shop-requests/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state.shop_request_service.get(&auth, parse_uuid(&id)?).await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// POST /api/shop-requests/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state
        .shop_request_service
        .accept(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// POST /api/shop-requests/{id}/decline
pub async fn decline(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state
        .shop_request_service
        .decline(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}

/// POST /api/shop-requests/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CompleteShopRequest>,
) -> ApiResult<Json<ApiResponse<ShopRequest>>> {
    let request = state
        .shop_request_service
        .complete(&auth, parse_uuid(&id)?, req.shop_id)
        .await?;
    Ok(Json(ApiResponse::ok(request)))
}
