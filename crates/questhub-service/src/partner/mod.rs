//! Partner applications, reviews, dashboards and shop request assignment.

pub mod assignment;
pub mod referral;
pub mod service;

pub use assignment::select_partner;
pub use service::{PartnerApplication, PartnerDashboard, PartnerService};
