//! Core type definitions used across the QuestHub workspace.

pub mod geo;
pub mod money;
pub mod pagination;
pub mod province;
pub mod response;

pub use geo::GeoPoint;
pub use money::FeeSplit;
pub use pagination::{PageRequest, PageResponse};
pub use province::{PROVINCES, canonical_province};
pub use response::ApiErrorResponse;
