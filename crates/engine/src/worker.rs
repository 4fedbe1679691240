use anyhow::Result;
use chrono::{DateTime, Utc};
use domain::{RemovalJob, NUKE_QUEUE_JOB};
use std::sync::Arc;
use std::time::Duration;
use storage::{Db, JobRow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::coordinator::DeferredRemovalCoordinator;

/// Polls the job table and runs due jobs.
pub struct JobWorker {
    db: Db,
    coordinator: Arc<DeferredRemovalCoordinator>,
    poll_interval: Duration,
    batch_size: i64,
}

impl JobWorker {
    pub fn new(
        db: Db,
        coordinator: Arc<DeferredRemovalCoordinator>,
        poll_interval: Duration,
        batch_size: i64,
    ) -> Self {
        Self {
            db,
            coordinator,
            poll_interval,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn run(self, cancel_token: CancellationToken) -> Result<()> {
        info!("Job worker started (poll every {:?})", self.poll_interval);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("Job worker stopping");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    if let Err(e) = self.run_due(Utc::now()).await {
                        error!("Job worker tick failed: {:#}", e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Claims and runs every job due at `now`. Returns how many ran.
    pub async fn run_due(&self, now: DateTime<Utc>) -> Result<usize> {
        let jobs = self.db.claim_due_jobs(now, self.batch_size).await?;
        let count = jobs.len();
        for job in jobs {
            self.run_job(job).await;
        }
        Ok(count)
    }

    async fn run_job(&self, job: JobRow) {
        if job.name != NUKE_QUEUE_JOB {
            warn!("Dropping job #{} with unknown name '{}'", job.id, job.name);
            return;
        }
        let payload: RemovalJob = match serde_json::from_str(&job.payload) {
            Ok(p) => p,
            Err(e) => {
                warn!("Dropping job #{} with invalid payload: {}", job.id, e);
                return;
            }
        };
        debug!(
            "Running {} #{} (attempt {}, due {})",
            job.name,
            job.id,
            payload.attempt,
            job.run_at()
        );
        match self.coordinator.run_removal_job(&payload).await {
            Ok(outcome) => debug!("Job #{} finished: {:?}", job.id, outcome),
            Err(e) => error!("Job #{} for {} failed: {:#}", job.id, payload.work_key, e),
        }
    }
}
