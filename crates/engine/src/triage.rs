use anyhow::Result;
use chrono::Utc;
use domain::format::{describe_batch, failure_message, success_line};
use domain::{
    ActionBatch, ActionKind, ActionResult, FilterCriteria, FilterEngine, ItemId, QueueItem,
    SkippedItem,
};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::dispatcher::ActionDispatcher;
use crate::error::ScanError;
use crate::pending::{PendingActionStore, PendingScope};
use crate::traits::Platform;

const REQUIRED_PERMISSIONS: [&str; 2] = ["all", "posts"];

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scanned: usize,
    pub batch: ActionBatch,
    pub skipped: Vec<SkippedItem>,
    /// Confirmation prompt; `None` when nothing matched and nothing was saved.
    pub description: Option<String>,
}

impl ScanReport {
    pub fn message(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| "No items found to nuke".to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NukeReport {
    pub results: Vec<(ActionKind, ActionResult)>,
    pub unresolved: usize,
    pub messages: Vec<String>,
    pub failure: Option<String>,
}

impl NukeReport {
    pub fn result(&self, action: ActionKind) -> ActionResult {
        self.results
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, r)| *r)
            .unwrap_or_default()
    }
}

/// Scan-then-confirm workflow over the moderation queue.
pub struct Triage {
    platform: Arc<dyn Platform>,
    pending: PendingActionStore,
    dispatcher: ActionDispatcher,
    subreddit: String,
}

impl Triage {
    pub fn new(
        platform: Arc<dyn Platform>,
        pending: PendingActionStore,
        dispatcher: ActionDispatcher,
        subreddit: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            pending,
            dispatcher,
            subreddit: subreddit.into(),
        }
    }

    fn scope(&self, actor: &str) -> PendingScope {
        PendingScope::new(actor, self.subreddit.clone())
    }

    async fn ensure_permission(&self, actor: &str) -> Result<(), ScanError> {
        let permissions = self
            .platform
            .moderator_permissions(actor)
            .await
            .map_err(ScanError::Queue)?;
        if permissions
            .iter()
            .any(|p| REQUIRED_PERMISSIONS.contains(&p.as_str()))
        {
            Ok(())
        } else {
            warn!("u/{} tried to scan r/{} without 'posts' permission", actor, self.subreddit);
            Err(ScanError::PermissionDenied)
        }
    }

    async fn fetch_queue(&self, criteria: &FilterCriteria) -> Result<Vec<QueueItem>, ScanError> {
        let limit = criteria.effective_scan_limit();
        let listings = try_join_all(
            criteria
                .item_type
                .kinds()
                .iter()
                .map(|kind| self.platform.list_queue(*kind, limit)),
        )
        .await
        .map_err(ScanError::Queue)?;

        let mut items: Vec<QueueItem> = listings.into_iter().flatten().collect();
        if let Some(limit) = limit {
            items.truncate(limit as usize);
        }
        Ok(items)
    }

    /// Partitions the queue and saves the resulting batch for `actor` to confirm.
    /// Nothing is persisted unless the whole scan succeeds.
    pub async fn scan(&self, actor: &str, criteria: &FilterCriteria) -> Result<ScanReport, ScanError> {
        self.ensure_permission(actor).await?;

        let moderators = self
            .platform
            .list_moderators()
            .await
            .map_err(ScanError::Queue)?;
        let engine = FilterEngine::new(criteria, moderators, Utc::now())?;
        let items = self.fetch_queue(criteria).await?;

        let outcome = engine.partition(&items);
        info!("Checked {} items in the modqueue", outcome.scanned);

        if outcome.batch.is_empty() {
            info!("No items found to nuke");
            return Ok(ScanReport {
                scanned: outcome.scanned,
                batch: outcome.batch,
                skipped: outcome.skipped,
                description: None,
            });
        }

        self.pending
            .save(&self.scope(actor), &outcome.batch)
            .await
            .map_err(ScanError::Store)?;

        let description = describe_batch(&outcome.batch);
        info!("{}", description);
        Ok(ScanReport {
            scanned: outcome.scanned,
            batch: outcome.batch,
            skipped: outcome.skipped,
            description: Some(description),
        })
    }

    async fn resolve_all(&self, batch: &ActionBatch) -> (HashMap<ItemId, QueueItem>, usize) {
        let mut ids: Vec<&ItemId> = ActionKind::ALL
            .iter()
            .flat_map(|action| batch.list(*action).ids.iter())
            .collect();
        ids.sort();
        ids.dedup();

        let resolved = join_all(ids.into_iter().map(|id| async move {
            (id, self.platform.resolve(id).await)
        }))
        .await;

        let mut items = HashMap::new();
        let mut unresolved = 0;
        for (id, result) in resolved {
            match result {
                Ok(item) => {
                    items.insert(id.clone(), item);
                }
                Err(e) => {
                    warn!("Could not load {}: {:#}", id, e);
                    unresolved += 1;
                }
            }
        }
        (items, unresolved)
    }

    /// Applies the batch saved by the last scan of `actor`.
    pub async fn confirm(&self, actor: &str) -> Result<NukeReport> {
        let scope = self.scope(actor);
        let batch = self.pending.load(&scope).await?;
        let (resolved, unresolved) = self.resolve_all(&batch).await;

        let items_for = |action: ActionKind| -> Vec<QueueItem> {
            batch
                .list(action)
                .ids
                .iter()
                .filter_map(|id| resolved.get(id).cloned())
                .collect()
        };
        let to_remove = items_for(ActionKind::Remove);
        let to_approve = items_for(ActionKind::Approve);
        let to_suppress = items_for(ActionKind::SuppressReports);
        info!(
            "Nuking {} items...",
            to_remove.len() + to_approve.len() + to_suppress.len()
        );

        let mutator = self.platform.as_ref();
        let (removed, approved, suppressed) = futures::join!(
            self.dispatcher.dispatch(mutator, ActionKind::Remove, &to_remove),
            self.dispatcher.dispatch(mutator, ActionKind::Approve, &to_approve),
            self.dispatcher.dispatch(mutator, ActionKind::SuppressReports, &to_suppress),
        );

        let results = vec![
            (ActionKind::Remove, removed),
            (ActionKind::Approve, approved),
            (ActionKind::SuppressReports, suppressed),
        ];
        let messages: Vec<String> = results
            .iter()
            .filter_map(|(action, result)| success_line(*action, result))
            .collect();
        for message in &messages {
            info!("{}", message);
        }
        let failure = failure_message(&results);
        if let Some(failure) = &failure {
            error!("{}", failure);
        }

        self.pending.clear(&scope).await?;

        Ok(NukeReport {
            results,
            unresolved,
            messages,
            failure,
        })
    }
}
