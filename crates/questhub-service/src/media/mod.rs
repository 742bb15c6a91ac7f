//! Image uploads and signed download links.

pub mod service;

pub use service::{MediaService, SignedMedia, UploadedMedia};
