//! Tourist attractions submitted by partners and curated by admins.

pub mod service;

pub use service::{AttractionRequest, AttractionService, AttractionUpdate};
