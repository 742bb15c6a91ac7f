//! Cron scheduler for the periodic marketplace jobs.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use questhub_core::config::WorkerConfig;
use questhub_core::error::AppError;

use crate::executor::{JobExecutor, ScheduledJob};

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Runs each tick under the single-runner lock
    executor: JobExecutor,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: JobExecutor) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the assignment sweep and quest expiry on their configured
    /// schedules.
    pub async fn register_default_tasks(
        &self,
        config: &WorkerConfig,
        assignment_sweep: Arc<dyn ScheduledJob>,
        quest_expiry: Arc<dyn ScheduledJob>,
    ) -> Result<(), AppError> {
        self.register(&config.assignment_sweep_cron, assignment_sweep)
            .await?;
        self.register(&config.quest_expiry_cron, quest_expiry).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Run `job` on a six-field cron schedule (seconds first).
    pub async fn register(
        &self,
        schedule: &str,
        job: Arc<dyn ScheduledJob>,
    ) -> Result<(), AppError> {
        let name = job.name();
        let executor = self.executor.clone();
        let cron = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = executor.clone();
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::debug!(job = job.name(), "Scheduled tick");
                executor.execute(&job).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {name}: {e}"))
        })?;

        self.scheduler
            .add(cron)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!(job = name, schedule, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use questhub_cache::CacheManager;
    use questhub_core::config::cache::CacheConfig;

    use super::*;
    use crate::executor::JobExecutionError;

    #[derive(Debug)]
    struct NoopJob;

    #[async_trait]
    impl ScheduledJob for NoopJob {
        fn name(&self) -> &'static str {
            "noop"
        }

        async fn run(&self) -> Result<Value, JobExecutionError> {
            Ok(Value::Null)
        }
    }

    async fn scheduler() -> CronScheduler {
        let cache = CacheManager::new(&CacheConfig::default()).await.unwrap();
        CronScheduler::new(JobExecutor::new(cache, Duration::from_secs(60)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_accepts_default_schedules() {
        let scheduler = scheduler().await;
        let config = WorkerConfig::default();
        scheduler
            .register_default_tasks(&config, Arc::new(NoopJob), Arc::new(NoopJob))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_register_rejects_bad_schedule() {
        let scheduler = scheduler().await;
        let err = scheduler
            .register("every ten minutes", Arc::new(NoopJob))
            .await
            .unwrap_err();
        assert!(err.message.contains("noop"));
    }
}
