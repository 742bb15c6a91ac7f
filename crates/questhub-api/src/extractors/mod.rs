//! Custom Axum extractors.

pub mod auth;
pub mod client_ip;
pub mod json;
pub mod pagination;
pub mod path;

pub use auth::{AuthUser, MaybeAuthUser};
pub use client_ip::client_ip;
pub use json::{ApiQuery, ValidatedJson};
pub use pagination::PaginationParams;
pub use path::{parse_optional, parse_uuid};
