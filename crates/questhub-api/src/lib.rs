//! # questhub-api
//!
//! HTTP API layer for QuestHub built on Axum.
//!
//! Provides the REST endpoints, middleware (rate limiting, CORS, logging),
//! extractors, DTOs and the mapping from domain errors to responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{launch, run_server};
pub use error::{ApiError, ApiResult};
pub use router::build_router;
pub use state::AppState;
