//! Route definitions for the QuestHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let server = &state.config.server;
    let body_limit = server.body_limit_bytes;
    let timeout = Duration::from_secs(server.request_timeout_seconds);
    let cors = build_cors_layer(&server.cors);

    // Tighter budget for credential endpoints and anonymous signups.
    let strict_routes = Router::new()
        .merge(auth_routes())
        .route("/shop-requests", post(handlers::shop_request::submit))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::strict,
        ));

    let api_routes = Router::new()
        .merge(strict_routes)
        .merge(user_routes())
        .merge(partner_routes())
        .merge(shop_request_routes())
        .merge(shop_routes())
        .merge(rider_routes())
        .merge(quest_routes())
        .merge(attraction_routes())
        .merge(media_routes())
        .merge(admin_routes())
        .merge(health_routes())
        .route("/provinces", get(handlers::province::list_provinces));

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::general,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: register, login, facebook, refresh, logout, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/facebook", post(handlers::auth::facebook))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/me",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/users/me/password", put(handlers::user::change_password))
        .route("/users/me/points", get(handlers::user::points))
}

/// Partner application, profile and dashboards
fn partner_routes() -> Router<AppState> {
    Router::new()
        .route("/partners/apply", post(handlers::partner::apply))
        .route(
            "/partners/me",
            get(handlers::partner::get_own).put(handlers::partner::update_own),
        )
        .route(
            "/partners/me/shop-requests",
            get(handlers::partner::my_shop_requests),
        )
        .route("/partners/me/shops", get(handlers::partner::my_shops))
        .route(
            "/partners/me/commissions",
            get(handlers::partner::my_commissions),
        )
        .route(
            "/partners/me/attractions",
            get(handlers::partner::my_attractions),
        )
}

/// Shop request handling by the assigned partner
fn shop_request_routes() -> Router<AppState> {
    Router::new()
        .route("/shop-requests/{id}", get(handlers::shop_request::get))
        .route(
            "/shop-requests/{id}/accept",
            post(handlers::shop_request::accept),
        )
        .route(
            "/shop-requests/{id}/decline",
            post(handlers::shop_request::decline),
        )
        .route(
            "/shop-requests/{id}/complete",
            post(handlers::shop_request::complete),
        )
}

/// Shop directory and registration
fn shop_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shops",
            get(handlers::shop::list_public).post(handlers::shop::register),
        )
        .route("/shops/mine", get(handlers::shop::list_mine))
        .route(
            "/shops/{id}",
            get(handlers::shop::get).put(handlers::shop::update),
        )
}

/// Rider application and profile
fn rider_routes() -> Router<AppState> {
    Router::new()
        .route("/riders/apply", post(handlers::rider::apply))
        .route(
            "/riders/me",
            get(handlers::rider::get_own).put(handlers::rider::update_own),
        )
}

/// Quests and submissions
fn quest_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/quests",
            get(handlers::quest::list).post(handlers::quest::create),
        )
        .route(
            "/quests/{id}",
            get(handlers::quest::get).put(handlers::quest::update),
        )
        .route("/quests/{id}/publish", post(handlers::quest::publish))
        .route("/quests/{id}/close", post(handlers::quest::close))
        .route(
            "/quests/{id}/submissions",
            get(handlers::submission::list_for_quest).post(handlers::submission::submit),
        )
        .route("/submissions/mine", get(handlers::submission::list_mine))
        .route(
            "/submissions/{id}/approve",
            post(handlers::submission::approve),
        )
        .route(
            "/submissions/{id}/reject",
            post(handlers::submission::reject),
        )
}

/// Tourist attractions
fn attraction_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attractions",
            get(handlers::attraction::list_public).post(handlers::attraction::create),
        )
        .route(
            "/attractions/{id}",
            get(handlers::attraction::get)
                .put(handlers::attraction::update)
                .delete(handlers::attraction::delete),
        )
}

/// Image upload, signing and signed downloads
fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/media/images", post(handlers::media::upload_image))
        .route("/media/sign", post(handlers::media::sign))
        .route(
            "/media/{id}",
            axum::routing::delete(handlers::media::delete),
        )
        .route("/media/files/{*key}", get(handlers::media::serve_file))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    use handlers::admin;

    Router::new()
        // Users
        .route("/admin/users", get(admin::users::list_users))
        .route("/admin/users/{id}", get(admin::users::get_user))
        .route("/admin/users/{id}/role", put(admin::users::change_role))
        .route("/admin/users/{id}/status", put(admin::users::change_status))
        // Partners
        .route("/admin/partners", get(admin::partners::list))
        .route(
            "/admin/partners/{id}/approve",
            post(admin::partners::approve),
        )
        .route("/admin/partners/{id}/reject", post(admin::partners::reject))
        .route(
            "/admin/partners/{id}/suspend",
            post(admin::partners::suspend),
        )
        .route(
            "/admin/partners/{id}/commission",
            put(admin::partners::set_commission),
        )
        // Shop requests
        .route("/admin/shop-requests", get(admin::shop_requests::list))
        .route(
            "/admin/shop-requests/{id}/reassign",
            post(admin::shop_requests::reassign),
        )
        .route(
            "/admin/shop-requests/{id}/cancel",
            post(admin::shop_requests::cancel),
        )
        // Shops
        .route("/admin/shops", get(admin::shops::list))
        .route("/admin/shops/{id}/approve", post(admin::shops::approve))
        .route("/admin/shops/{id}/reject", post(admin::shops::reject))
        .route("/admin/shops/{id}/suspend", post(admin::shops::suspend))
        // Riders
        .route("/admin/riders", get(admin::riders::list))
        .route("/admin/riders/{id}/approve", post(admin::riders::approve))
        .route("/admin/riders/{id}/reject", post(admin::riders::reject))
        .route("/admin/riders/{id}/suspend", post(admin::riders::suspend))
        // Attractions
        .route("/admin/attractions", get(admin::attractions::list))
        .route(
            "/admin/attractions/{id}/approve",
            post(admin::attractions::approve),
        )
        .route(
            "/admin/attractions/{id}/reject",
            post(admin::attractions::reject),
        )
        // Commission
        .route(
            "/admin/fee-splits",
            get(admin::fee_splits::list).post(admin::fee_splits::record),
        )
        .route(
            "/admin/fee-splits/summary",
            get(admin::fee_splits::summary),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
