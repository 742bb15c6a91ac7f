//! Close quests whose window has ended.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use questhub_service::QuestService;

use crate::executor::{JobExecutionError, ScheduledJob};

/// Moves active quests past `ends_at` to closed.
#[derive(Debug)]
pub struct QuestExpiryJob {
    quests: Arc<QuestService>,
}

impl QuestExpiryJob {
    /// Create the job.
    pub fn new(quests: Arc<QuestService>) -> Self {
        Self { quests }
    }
}

#[async_trait]
impl ScheduledJob for QuestExpiryJob {
    fn name(&self) -> &'static str {
        "quest_expiry"
    }

    async fn run(&self) -> Result<Value, JobExecutionError> {
        let closed = self.quests.close_expired().await?;
        Ok(serde_json::json!({ "closed": closed }))
    }
}
