//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it and builds the request context.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use questhub_auth::jwt::Claims;
use questhub_core::error::AppError;
use questhub_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::client_ip::client_ip;
use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Context passed into service calls.
    pub ctx: RequestContext,
    /// The validated access token claims.
    pub claims: Claims,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

/// Caller on routes that also serve anonymous clients.
///
/// A missing header yields `None`; a present but invalid token is still
/// rejected so clients notice expired sessions.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    /// The caller's context, if signed in.
    pub fn ctx(&self) -> Option<&RequestContext> {
        self.0.as_ref().map(|u| &u.ctx)
    }
}

fn bearer(parts: &Parts) -> Option<Result<&str, AppError>> {
    let value = parts.headers.get(header::AUTHORIZATION)?;
    Some(
        value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format")),
    )
}

async fn authenticate(parts: &Parts, state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let claims = state.jwt_decoder.decode_access_token(token).await?;
    let ip = client_ip(parts, state.config.server.trust_forwarded_for);
    let ctx = RequestContext::new(claims.user_id(), claims.role, claims.username.clone(), ip);
    Ok(AuthUser { ctx, claims })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))??;
        Ok(authenticate(parts, state, token).await?)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer(parts) {
            None => Ok(Self(None)),
            Some(token) => {
                let token = token?;
                Ok(Self(Some(authenticate(parts, state, token).await?)))
            }
        }
    }
}
