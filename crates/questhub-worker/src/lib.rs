//! Scheduled background jobs for QuestHub.
//!
//! This crate provides:
//! - A cron scheduler that runs each job on its schedule
//! - A single-runner guard so only one instance runs a job at a time
//! - The marketplace jobs: shop request assignment sweep and quest expiry

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, ScheduledJob};
pub use scheduler::CronScheduler;
