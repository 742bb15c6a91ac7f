//! Core traits defined in `questhub-core` and implemented by other crates.

pub mod cache;
pub mod storage;

pub use cache::CacheProvider;
pub use storage::StorageProvider;
