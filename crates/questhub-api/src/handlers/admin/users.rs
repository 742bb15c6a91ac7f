//! Admin user management.

use axum::Json;
use axum::extract::{Path, State};

use questhub_core::types::PageResponse;
use questhub_entity::user::User;

use crate::dto::query::UserQuery;
use crate::dto::request::{ChangeRoleRequest, ChangeStatusRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{ApiQuery, AuthUser, PaginationParams, ValidatedJson, parse_uuid};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<UserQuery>,
    ApiQuery(page): ApiQuery<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<User>>>> {
    let users = state
        .admin_user_service
        .list_users(&auth, query.into_filter()?, page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(users)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .admin_user_service
        .get_user(&auth, parse_uuid(&id)?)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}/role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangeRoleRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .admin_user_service
        .change_role(&auth, parse_uuid(&id)?, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}/status
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .admin_user_service
        .change_status(&auth, parse_uuid(&id)?, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}
