//! # questhub-entity
//!
//! Domain entity models for QuestHub. Every struct in this crate represents
//! a database table row or a domain value object. Row structs derive
//! `sqlx::FromRow`; status enums map onto PostgreSQL enum types.

mod macros;

pub mod attraction;
pub mod fee_split;
pub mod media;
pub mod partner;
pub mod quest;
pub mod review;
pub mod rider;
pub mod shop;
pub mod shop_request;
pub mod user;

pub use review::ReviewStatus;
