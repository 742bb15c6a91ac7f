//! Auth handlers: register, login, Facebook login, refresh, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use questhub_entity::user::User;

use crate::dto::request::{
    FacebookLoginRequest, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
};
use crate::dto::response::{ApiResponse, AuthResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let session = state.auth_service.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session.into()))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let session = state.auth_service.login(&req.login, &req.password).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/facebook
pub async fn facebook(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<FacebookLoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let session = state.auth_service.facebook_login(&req.access_token).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<ApiResponse<AuthResponse>>> {
    let session = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<ValidatedJson<LogoutRequest>>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    let req = body.map(|ValidatedJson(r)| r).unwrap_or_default();
    state
        .auth_service
        .logout(&auth.claims, req.refresh_token.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}
