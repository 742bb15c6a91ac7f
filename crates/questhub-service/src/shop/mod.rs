//! Shop registration, public listing and admin review.

pub mod service;

pub use service::{ShopRegistration, ShopService, ShopUpdate};
