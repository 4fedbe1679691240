use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::{ActionKind, ItemId, ItemKind, QueueItem};
use std::collections::HashSet;

use crate::error::ActionError;

/// Read side of the moderation queue.
#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn list_queue(&self, kind: ItemKind, limit: Option<u32>) -> Result<Vec<QueueItem>>;

    async fn list_moderators(&self) -> Result<HashSet<String>>;

    async fn moderator_permissions(&self, actor: &str) -> Result<Vec<String>>;
}

/// Single-item moderation actions.
#[async_trait]
pub trait ItemMutator: Send + Sync {
    async fn remove(&self, item: &QueueItem) -> Result<(), ActionError>;

    async fn approve(&self, item: &QueueItem) -> Result<(), ActionError>;

    /// Must return [`ActionError::Unsupported`] for comments.
    async fn suppress_reports(&self, item: &QueueItem) -> Result<(), ActionError>;

    async fn remove_by_id(&self, id: &ItemId) -> Result<(), ActionError>;

    async fn apply(&self, action: ActionKind, item: &QueueItem) -> Result<(), ActionError> {
        match action {
            ActionKind::Remove => self.remove(item).await,
            ActionKind::Approve => self.approve(item).await,
            ActionKind::SuppressReports => self.suppress_reports(item).await,
        }
    }
}

#[async_trait]
pub trait ItemResolver: Send + Sync {
    /// Fetches a live item, dispatching on the id prefix.
    async fn resolve(&self, id: &ItemId) -> Result<QueueItem>;
}

/// Everything the engine needs from the moderation platform.
pub trait Platform: QueueSource + ItemMutator + ItemResolver {}

impl<T: QueueSource + ItemMutator + ItemResolver> Platform for T {}

/// Key-value and sorted-set primitives. Every operation is atomic on its key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// All-or-nothing write of several keys.
    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Check-and-set: returns `true` only for the caller that created the key.
    async fn create_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    async fn sorted_set_add(&self, key: &str, members: &[(String, f64)]) -> Result<()>;

    async fn sorted_set_range(&self, key: &str) -> Result<Vec<String>>;

    async fn sorted_set_remove(&self, key: &str, members: &[String]) -> Result<()>;
}

/// "Run this job no earlier than `run_at`".
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn schedule(&self, name: &str, run_at: DateTime<Utc>, payload: serde_json::Value) -> Result<()>;
}
