//! Rider applications and admin review.

pub mod service;

pub use service::{RiderApplication, RiderService, RiderUpdate};
