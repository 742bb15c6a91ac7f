//! Route handlers organized by domain.

pub mod admin;
pub mod attraction;
pub mod auth;
pub mod health;
pub mod media;
pub mod partner;
pub mod province;
pub mod quest;
pub mod rider;
pub mod shop;
pub mod shop_request;
pub mod submission;
pub mod user;
