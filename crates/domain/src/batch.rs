use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{ItemId, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Remove,
    Approve,
    SuppressReports,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [
        ActionKind::Remove,
        ActionKind::Approve,
        ActionKind::SuppressReports,
    ];

    /// "Failed to {imperative} ..."
    pub fn imperative(&self) -> &'static str {
        match self {
            ActionKind::Remove => "remove",
            ActionKind::Approve => "re-approve",
            ActionKind::SuppressReports => "ignore reports on",
        }
    }

    /// "Error while {progressive} ..."
    pub fn progressive(&self) -> &'static str {
        match self {
            ActionKind::Remove => "removing",
            ActionKind::Approve => "re-approving",
            ActionKind::SuppressReports => "ignoring reports on",
        }
    }

    /// "Successfully {past} ..."
    pub fn past(&self) -> &'static str {
        match self {
            ActionKind::Remove => "removed",
            ActionKind::Approve => "re-approved",
            ActionKind::SuppressReports => "ignored reports on",
        }
    }

    /// Suffix of the persisted id-list key.
    pub fn store_suffix(&self) -> &'static str {
        match self {
            ActionKind::Remove => "itemsToRemove",
            ActionKind::Approve => "itemsToApprove",
            ActionKind::SuppressReports => "itemsToIgnoreReports",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.imperative())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub posts: usize,
    pub comments: usize,
}

impl KindCounts {
    pub fn record(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Post => self.posts += 1,
            ItemKind::Comment => self.comments += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.posts + self.comments
    }
}

/// Ids and per-kind counts for one action of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionList {
    pub ids: Vec<ItemId>,
    pub counts: KindCounts,
}

impl ActionList {
    pub fn push(&mut self, id: ItemId, kind: ItemKind) {
        self.counts.record(kind);
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn from_ids(ids: Vec<ItemId>) -> Self {
        let mut counts = KindCounts::default();
        for id in &ids {
            counts.record(id.kind());
        }
        Self { ids, counts }
    }
}

/// The three id lists produced by a scan. Crosses the confirm boundary as ids only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionBatch {
    pub to_remove: ActionList,
    pub to_approve: ActionList,
    pub to_suppress_reports: ActionList,
}

impl ActionBatch {
    pub fn list(&self, action: ActionKind) -> &ActionList {
        match action {
            ActionKind::Remove => &self.to_remove,
            ActionKind::Approve => &self.to_approve,
            ActionKind::SuppressReports => &self.to_suppress_reports,
        }
    }

    pub fn list_mut(&mut self, action: ActionKind) -> &mut ActionList {
        match action {
            ActionKind::Remove => &mut self.to_remove,
            ActionKind::Approve => &mut self.to_approve,
            ActionKind::SuppressReports => &mut self.to_suppress_reports,
        }
    }

    pub fn total(&self) -> usize {
        ActionKind::ALL.iter().map(|a| self.list(*a).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Outcome of applying one action to a batch of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub post_count: usize,
    pub comment_count: usize,
    pub failed_count: usize,
}

impl ActionResult {
    pub fn succeeded(&self) -> usize {
        self.post_count + self.comment_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ids_counts_by_prefix() {
        let list = ActionList::from_ids(vec!["t1_a".into(), "t3_b".into(), "t1_c".into()]);
        assert_eq!(list.counts, KindCounts { posts: 1, comments: 2 });
    }

    #[test]
    fn batch_total_spans_all_lists() {
        let mut batch = ActionBatch::default();
        assert!(batch.is_empty());
        batch.to_remove.push("t3_a".into(), ItemKind::Post);
        batch.to_approve.push("t1_b".into(), ItemKind::Comment);
        assert_eq!(batch.total(), 2);
    }
}
