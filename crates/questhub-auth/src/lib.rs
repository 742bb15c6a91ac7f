//! # questhub-auth
//!
//! Authentication and authorization for QuestHub.
//!
//! ## Modules
//!
//! - `jwt`: access/refresh token creation, validation and revocation
//! - `password`: Argon2id password hashing and policy enforcement
//! - `rbac`: role-based permission checks
//! - `social`: third-party identity verification (Facebook)

pub mod jwt;
pub mod password;
pub mod rbac;
pub mod social;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{Permission, RbacEnforcer, RbacPolicies};
pub use social::{FacebookVerifier, SocialProfile, SocialTokenVerifier};
