//! # questhub-service
//!
//! Business logic for QuestHub. Each service orchestrates repositories,
//! cache, storage and authentication to implement one area of the
//! marketplace: accounts, partners and their shop requests, shops, riders,
//! quests, attractions, commission and media.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references, and every operation takes
//! the caller's [`RequestContext`].

pub mod attraction;
pub mod auth;
pub mod commission;
pub mod context;
pub mod media;
pub mod partner;
pub mod quest;
pub mod rider;
pub mod shop;
pub mod shop_request;
pub mod user;
pub mod validate;

pub use attraction::AttractionService;
pub use auth::{AuthService, AuthSession, RegisterRequest};
pub use commission::CommissionService;
pub use context::RequestContext;
pub use media::MediaService;
pub use partner::{PartnerDashboard, PartnerService};
pub use quest::{QuestService, SubmissionService};
pub use rider::RiderService;
pub use shop::ShopService;
pub use shop_request::{ShopRequestService, SweepReport};
pub use user::{AdminUserService, UserService};
