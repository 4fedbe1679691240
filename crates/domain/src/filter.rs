use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::info;

use crate::batch::{ActionBatch, ActionKind};
use crate::criteria::{CriteriaError, FilterCriteria};
use crate::models::{ItemId, ItemKind, QueueItem};
use crate::predicates::{self, Check, KeywordMatcher, PREVIOUSLY_APPROVED};

type Predicate = Box<dyn Fn(&QueueItem) -> Check + Send + Sync>;

/// Where a single item ends up after evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Remove,
    /// Previously approved item, short-circuited before the remaining checks.
    PreviouslyApproved { approve: bool, suppress_reports: bool },
    Skip(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    pub author_name: String,
    pub reason: String,
}

impl SkippedItem {
    pub fn new(item: &QueueItem, reason: impl Into<String>) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind(),
            author_name: item.author_name.clone(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skipping {} id: {} by u/{} because {}",
            self.kind,
            self.id.short(),
            self.author_name,
            self.reason
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub batch: ActionBatch,
    pub skipped: Vec<SkippedItem>,
    pub scanned: usize,
}

/// Partitions queue items into remove / re-approve / ignore-reports / skip.
pub struct FilterEngine {
    previously_approved_branch: bool,
    reapprove: bool,
    suppress_reports: bool,
    checks: Vec<Predicate>,
}

impl FilterEngine {
    pub fn new(
        criteria: &FilterCriteria,
        moderators: HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, CriteriaError> {
        criteria.validate()?;
        let mut checks: Vec<Predicate> = Vec::new();

        if let (true, Some(max)) = (criteria.check_score, criteria.max_score) {
            checks.push(Box::new(move |item: &QueueItem| predicates::score(item, max)));
        }
        if let (true, Some(min)) = (criteria.check_age, criteria.min_age) {
            checks.push(Box::new(move |item: &QueueItem| predicates::age(item, min, now)));
        }
        if let (true, Some(min)) = (criteria.check_reports, criteria.min_reports) {
            checks.push(Box::new(move |item: &QueueItem| predicates::reports(item, min)));
        }
        if criteria.ignore_sticky {
            checks.push(Box::new(predicates::not_stickied));
        }
        if let Some(keywords) = criteria.keyword_text() {
            let matcher = KeywordMatcher::new(keywords, criteria.use_regex, "keywords")?;
            checks.push(Box::new(move |item: &QueueItem| predicates::keywords(item, &matcher)));
        }
        if let Some(keywords) = criteria.report_keyword_text() {
            let matcher =
                KeywordMatcher::new(keywords, criteria.report_use_regex, "report keywords")?;
            let ignore_user = criteria.ignore_user_reports;
            checks.push(Box::new(move |item: &QueueItem| {
                predicates::report_keywords(item, &matcher, ignore_user)
            }));
        }
        if criteria.ignore_moderator || criteria.ignore_visible {
            let (ignore_moderator, ignore_visible) =
                (criteria.ignore_moderator, criteria.ignore_visible);
            checks.push(Box::new(move |item: &QueueItem| {
                predicates::moderator_or_visible(item, &moderators, ignore_moderator, ignore_visible)
            }));
        }

        Ok(Self {
            previously_approved_branch: criteria.previously_approved_branch(),
            reapprove: criteria.reapprove_previously_approved,
            suppress_reports: criteria.ignore_reports_previously_approved,
            checks,
        })
    }

    pub fn evaluate(&self, item: &QueueItem) -> Destination {
        if self.previously_approved_branch {
            if let Err(reason) = predicates::not_previously_approved(item) {
                // Report suppression is not available for comments.
                let suppress_reports =
                    self.suppress_reports && item.kind() == ItemKind::Post;
                if !self.reapprove && !suppress_reports {
                    return Destination::Skip(reason);
                }
                return Destination::PreviouslyApproved {
                    approve: self.reapprove,
                    suppress_reports,
                };
            }
        }
        match self.checks.iter().try_for_each(|check| check(item)) {
            Ok(()) => Destination::Remove,
            Err(reason) => Destination::Skip(reason),
        }
    }

    pub fn partition<'a, I>(&self, items: I) -> ScanOutcome
    where
        I: IntoIterator<Item = &'a QueueItem>,
    {
        let mut outcome = ScanOutcome::default();
        for item in items {
            outcome.scanned += 1;
            match self.evaluate(item) {
                Destination::Remove => {
                    outcome
                        .batch
                        .list_mut(ActionKind::Remove)
                        .push(item.id.clone(), item.kind());
                }
                Destination::PreviouslyApproved {
                    approve,
                    suppress_reports,
                } => {
                    info!("{}", SkippedItem::new(item, PREVIOUSLY_APPROVED));
                    if approve {
                        outcome
                            .batch
                            .list_mut(ActionKind::Approve)
                            .push(item.id.clone(), item.kind());
                    }
                    if suppress_reports {
                        outcome
                            .batch
                            .list_mut(ActionKind::SuppressReports)
                            .push(item.id.clone(), item.kind());
                    }
                }
                Destination::Skip(reason) => {
                    let skipped = SkippedItem::new(item, reason);
                    info!("{}", skipped);
                    outcome.skipped.push(skipped);
                }
            }
        }
        outcome
    }
}
