//! Job execution with a cache-backed single-runner lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing;
use uuid::Uuid;

use questhub_cache::CacheManager;
use questhub_cache::keys;
use questhub_core::error::AppError;
use questhub_core::traits::cache::CacheProvider;

/// A periodic task.
#[async_trait]
pub trait ScheduledJob: Send + Sync + std::fmt::Debug {
    /// Stable name, used for the lock key and in logs.
    fn name(&self) -> &'static str;

    /// Run the task once and report what it did.
    async fn run(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Transient failure; the next tick retries
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// What happened to one tick of a job.
#[derive(Debug)]
pub enum JobOutcome {
    /// The job ran and returned this summary.
    Completed(Value),
    /// Another instance holds the lock.
    Skipped,
    /// The job failed.
    Failed(JobExecutionError),
}

/// Runs jobs so that at most one instance executes a given job at a time.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    cache: CacheManager,
    lock_ttl: Duration,
    instance_id: String,
}

impl JobExecutor {
    /// Create an executor. `lock_ttl` bounds how long a crashed runner can
    /// block the others.
    pub fn new(cache: CacheManager, lock_ttl: Duration) -> Self {
        Self {
            cache,
            lock_ttl,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Run `job` if no other instance is running it.
    ///
    /// If the cache is unreachable the job runs anyway; every job is safe to
    /// run concurrently, the lock only avoids duplicate work.
    pub async fn execute(&self, job: &Arc<dyn ScheduledJob>) -> JobOutcome {
        let lock_key = keys::job_lock(job.name());
        let locked = match self
            .cache
            .set_nx(&lock_key, &self.instance_id, self.lock_ttl)
            .await
        {
            Ok(acquired) => acquired,
            Err(e) => {
                tracing::warn!(
                    job = job.name(),
                    error = %e,
                    "Job lock unavailable, running unguarded"
                );
                true
            }
        };
        if !locked {
            tracing::debug!(job = job.name(), "Job is running elsewhere, skipping");
            return JobOutcome::Skipped;
        }

        let started = Instant::now();
        let outcome = match job.run().await {
            Ok(summary) => {
                tracing::info!(
                    job = job.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    summary = %summary,
                    "Job completed"
                );
                JobOutcome::Completed(summary)
            }
            Err(e) => {
                tracing::error!(job = job.name(), error = %e, "Job failed");
                JobOutcome::Failed(e)
            }
        };

        if let Err(e) = self.cache.delete(&lock_key).await {
            tracing::warn!(job = job.name(), error = %e, "Failed to release job lock");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use questhub_core::config::cache::CacheConfig;

    use super::*;

    #[derive(Debug, Default)]
    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn run(&self) -> Result<Value, JobExecutionError> {
            let runs = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(serde_json::json!({ "runs": runs }))
        }
    }

    #[derive(Debug)]
    struct FailingJob;

    #[async_trait]
    impl ScheduledJob for FailingJob {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn run(&self) -> Result<Value, JobExecutionError> {
            Err(JobExecutionError::Transient("database unreachable".to_string()))
        }
    }

    async fn executor() -> JobExecutor {
        let cache = CacheManager::new(&CacheConfig::default()).await.unwrap();
        JobExecutor::new(cache, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_runs_and_releases_lock() {
        let executor = executor().await;
        let job: Arc<dyn ScheduledJob> = Arc::new(CountingJob::default());
        assert!(matches!(executor.execute(&job).await, JobOutcome::Completed(_)));
        // The lock was released, so the next tick runs again.
        match executor.execute(&job).await {
            JobOutcome::Completed(summary) => assert_eq!(summary["runs"], 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_skips_while_locked_elsewhere() {
        let executor = executor().await;
        executor
            .cache
            .set_nx(&keys::job_lock("counting"), "other-instance", Duration::from_secs(60))
            .await
            .unwrap();
        let job: Arc<dyn ScheduledJob> = Arc::new(CountingJob::default());
        assert!(matches!(executor.execute(&job).await, JobOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_unlocks() {
        let executor = executor().await;
        let job: Arc<dyn ScheduledJob> = Arc::new(FailingJob);
        assert!(matches!(executor.execute(&job).await, JobOutcome::Failed(_)));
        assert!(!executor.cache.exists(&keys::job_lock("failing")).await.unwrap());
    }
}
