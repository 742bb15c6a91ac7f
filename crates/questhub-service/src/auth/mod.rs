//! Account authentication: password, Facebook and token lifecycle.

pub mod service;

pub use service::{AuthService, AuthSession, RegisterRequest};
