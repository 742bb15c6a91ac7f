//! Retry unassigned shop requests and move timed-out ones on.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use questhub_service::ShopRequestService;

use crate::executor::{JobExecutionError, ScheduledJob};

/// Runs the shop request assignment sweep.
#[derive(Debug)]
pub struct AssignmentSweepJob {
    requests: Arc<ShopRequestService>,
}

impl AssignmentSweepJob {
    /// Create the job.
    pub fn new(requests: Arc<ShopRequestService>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl ScheduledJob for AssignmentSweepJob {
    fn name(&self) -> &'static str {
        "assignment_sweep"
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let report = self.requests.sweep().await?;
        Ok(serde_json::json!({
            "assigned": report.assigned,
            "reassigned": report.reassigned,
            "still_pending": report.still_pending,
            "failed": report.failed,
        }))
    }
}
