use domain::{ActionKind, ActionResult, ItemKind, QueueItem};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::error::ActionError;
use crate::traits::ItemMutator;

enum ItemOutcome {
    Applied(ItemKind),
    Unsupported,
    Failed,
}

/// Applies one action to a batch of items concurrently, retrying each item on its own.
#[derive(Debug, Clone, Copy)]
pub struct ActionDispatcher {
    retry_limit: u32,
}

impl ActionDispatcher {
    pub fn new(retry_limit: u32) -> Self {
        Self {
            retry_limit: retry_limit.max(1),
        }
    }

    pub fn retry_limit(&self) -> u32 {
        self.retry_limit
    }

    pub async fn dispatch<M: ItemMutator + ?Sized>(
        &self,
        mutator: &M,
        action: ActionKind,
        items: &[QueueItem],
    ) -> ActionResult {
        let outcomes = join_all(
            items
                .iter()
                .map(|item| self.apply_with_retry(mutator, action, item)),
        )
        .await;

        let mut result = ActionResult::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Applied(ItemKind::Post) => result.post_count += 1,
                ItemOutcome::Applied(ItemKind::Comment) => result.comment_count += 1,
                ItemOutcome::Unsupported => {}
                ItemOutcome::Failed => result.failed_count += 1,
            }
        }
        result
    }

    async fn apply_with_retry<M: ItemMutator + ?Sized>(
        &self,
        mutator: &M,
        action: ActionKind,
        item: &QueueItem,
    ) -> ItemOutcome {
        for attempt in 1..=self.retry_limit {
            match mutator.apply(action, item).await {
                Ok(()) => return ItemOutcome::Applied(item.kind()),
                Err(ActionError::Unsupported { action, kind }) => {
                    info!(
                        "Action '{}' does not exist for item of type {} ({})",
                        action, kind, item.id
                    );
                    return ItemOutcome::Unsupported;
                }
                Err(ActionError::Failed(e)) => {
                    if attempt == self.retry_limit {
                        error!(
                            "Error while {} {} by u/{}: {:#}",
                            action.progressive(),
                            item.permalink_or_id(),
                            item.author_name,
                            e
                        );
                        return ItemOutcome::Failed;
                    }
                    warn!(
                        "Retrying {} {} by u/{} {}/{}: {:#}",
                        action.progressive(),
                        item.permalink_or_id(),
                        item.author_name,
                        attempt,
                        self.retry_limit,
                        e
                    );
                }
            }
        }
        ItemOutcome::Failed
    }
}
