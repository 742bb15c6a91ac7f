//! # questhub-core
//!
//! Core crate for QuestHub. Contains configuration schemas, the unified
//! error system, pagination, Thai province and geo helpers, money splitting,
//! and the cache/storage provider traits.
//!
//! This crate has **no** internal dependencies on other QuestHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
