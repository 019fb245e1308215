//! Database-backed background task queue.
//!
//! Callers enqueue a named payload and move on; the engine worker claims
//! pending rows and executes them. Delivery is at-least-once: a worker
//! crash between claim and completion leaves the row `running`, and there
//! is no idempotency ledger to stop a re-enqueued task from double-sending.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::common::error::Result;
use crate::storage::Storage;

/// The work a task row carries, serialized into its `args` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum TaskPayload {
    SendWelcomeEmail {
        username: String,
        email: String,
    },
    NotifyCategorySubscribers {
        post_id: Uuid,
        category_id: Uuid,
    },
    SendWeeklyDigest,
}

impl TaskPayload {
    pub fn name(&self) -> &'static str {
        match self {
            TaskPayload::SendWelcomeEmail { .. } => "send_welcome_email",
            TaskPayload::NotifyCategorySubscribers { .. } => "notify_category_subscribers",
            TaskPayload::SendWeeklyDigest => "send_weekly_digest",
        }
    }
}

/// A queue row as persisted. `args` holds the JSON-serialized payload.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub id: Uuid,
    pub name: String,
    pub args: String,
    pub attempts: i64,
    pub created_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn payload(&self) -> Result<TaskPayload> {
        Ok(serde_json::from_str(&self.args)?)
    }
}

/// Producer handle over the queue table.
#[derive(Clone)]
pub struct TaskQueue {
    storage: Arc<dyn Storage>,
}

impl TaskQueue {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Enqueue a payload for asynchronous execution and return the task id.
    /// No delivery confirmation flows back to the caller.
    pub async fn enqueue(&self, payload: &TaskPayload) -> Result<Uuid> {
        let record = TaskRecord {
            id: Uuid::new_v4(),
            name: payload.name().to_string(),
            args: serde_json::to_string(payload)?,
            attempts: 0,
            created_at: Utc::now(),
        };
        self.storage.enqueue_task(&record).await?;
        debug!(task = %record.name, id = %record.id, "Enqueued task");
        Ok(record.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_json() {
        let payload = TaskPayload::NotifyCategorySubscribers {
            post_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: TaskPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn payload_names_are_stable() {
        let payload = TaskPayload::SendWelcomeEmail {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert_eq!(payload.name(), "send_welcome_email");
        assert_eq!(TaskPayload::SendWeeklyDigest.name(), "send_weekly_digest");
    }
}
