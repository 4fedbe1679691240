use anyhow::Result;
use domain::{ActionBatch, ActionKind, ActionList, ItemId};
use std::sync::Arc;
use tracing::debug;

use crate::traits::KeyValueStore;

/// Moderator and community a pending batch belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScope {
    pub actor: String,
    pub subreddit: String,
}

impl PendingScope {
    pub fn new(actor: impl Into<String>, subreddit: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            subreddit: subreddit.into(),
        }
    }

    pub fn key(&self, action: ActionKind) -> String {
        format!("{}:{}_{}", self.subreddit, self.actor, action.store_suffix())
    }
}

/// Holds the id lists of a scan until the moderator confirms them.
#[derive(Clone)]
pub struct PendingActionStore {
    store: Arc<dyn KeyValueStore>,
}

impl PendingActionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Writes all three lists together.
    pub async fn save(&self, scope: &PendingScope, batch: &ActionBatch) -> Result<()> {
        let entries: Vec<(String, String)> = ActionKind::ALL
            .iter()
            .map(|action| (scope.key(*action), join_ids(&batch.list(*action).ids)))
            .collect();
        self.store.set_many(&entries).await
    }

    pub async fn load(&self, scope: &PendingScope) -> Result<ActionBatch> {
        let mut batch = ActionBatch::default();
        for action in ActionKind::ALL {
            let stored = self.store.get(&scope.key(action)).await?.unwrap_or_default();
            let ids = split_ids(&stored);
            debug!("{}: {:?}", scope.key(action), ids);
            *batch.list_mut(action) = ActionList::from_ids(ids);
        }
        Ok(batch)
    }

    pub async fn clear(&self, scope: &PendingScope) -> Result<()> {
        for action in ActionKind::ALL {
            self.store.delete(&scope.key(action)).await?;
        }
        Ok(())
    }
}

fn join_ids(ids: &[ItemId]) -> String {
    ids.iter()
        .map(ItemId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_ids(stored: &str) -> Vec<ItemId> {
    stored
        .split(',')
        .filter(|id| !id.is_empty())
        .map(ItemId::from)
        .collect()
}
