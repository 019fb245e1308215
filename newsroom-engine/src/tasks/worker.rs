//! Task-queue worker: poll, claim, execute, settle.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use newsroom_core::config::Settings;
use newsroom_core::storage::Storage;
use newsroom_core::tasks::TaskRecord;
use newsroom_core::Result;

use crate::mail::Mailer;
use crate::observability::metrics::{increment, MetricName};
use crate::tasks::handlers;

/// How many pending rows one poll claims.
const CLAIM_BATCH: i64 = 10;

pub struct Worker {
    storage: Arc<dyn Storage>,
    mailer: Arc<dyn Mailer>,
    settings: Arc<Settings>,
}

impl Worker {
    pub fn new(storage: Arc<dyn Storage>, mailer: Arc<dyn Mailer>, settings: Arc<Settings>) -> Self {
        Self {
            storage,
            mailer,
            settings,
        }
    }

    /// Poll the queue forever. A failed poll is logged and retried on the
    /// next tick; task failures never take the loop down.
    pub async fn run(&self) -> Result<()> {
        info!(
            backend = self.mailer.name(),
            poll_secs = self.settings.worker_poll_secs,
            "Task worker started"
        );
        let mut poll = tokio::time::interval(Duration::from_secs(self.settings.worker_poll_secs.max(1)));
        loop {
            poll.tick().await;
            if let Err(e) = self.run_once().await {
                error!(error = %e, "Worker poll failed");
            }
        }
    }

    /// Claim and execute one batch of pending tasks. Returns how many were
    /// claimed, so callers can drain the queue by looping until zero.
    pub async fn run_once(&self) -> Result<usize> {
        let claimed = self.storage.claim_pending_tasks(CLAIM_BATCH).await?;
        let count = claimed.len();
        for task in claimed {
            self.execute(task).await;
        }
        Ok(count)
    }

    async fn execute(&self, task: TaskRecord) {
        let payload = match task.payload() {
            Ok(payload) => payload,
            Err(e) => {
                error!(task = %task.name, id = %task.id, error = %e, "Undecodable task payload");
                self.settle_failed(&task).await;
                return;
            }
        };

        info!(task = %task.name, id = %task.id, attempt = task.attempts, "Executing task");
        match handlers::execute(
            self.storage.as_ref(),
            self.mailer.as_ref(),
            &self.settings,
            payload,
        )
        .await
        {
            Ok(()) => {
                increment(MetricName::TasksExecuted);
                if let Err(e) = self.storage.mark_task_done(task.id).await {
                    error!(id = %task.id, error = %e, "Failed to mark task done");
                }
            }
            Err(e) => {
                error!(task = %task.name, id = %task.id, error = %e, "Task failed");
                self.settle_failed(&task).await;
            }
        }
    }

    async fn settle_failed(&self, task: &TaskRecord) {
        increment(MetricName::TasksFailed);
        if let Err(e) = self.storage.mark_task_failed(task.id).await {
            error!(id = %task.id, error = %e, "Failed to mark task failed");
        }
    }
}
