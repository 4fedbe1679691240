//! Deferred removal of queued comments after their post is removed or locked.
//!
//! A trigger takes a short-lived lock per post so near-simultaneous "remove"
//! and "lock" events start at most one workflow. The matching comment ids go
//! into a per-post work-set and a removal job drains it. Each job run
//! schedules its successor before touching any comment, so a crash mid-run
//! still leaves a retry behind; set membership, not the attempt counter,
//! decides what is left to do.

use anyhow::Result;
use chrono::{Duration, Utc};
use domain::{
    lock_key, work_queue_key, IgnoredEvent, ItemId, ItemKind, ModActionEvent, RemovalJob,
    TriggerKind, NUKE_QUEUE_JOB,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::traits::{JobScheduler, KeyValueStore, Platform};
use crate::TriageConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The event is not a post removal or post lock.
    Ignored { reason: String },
    /// The matching `nuke_on_post_*` setting is off.
    Disabled,
    /// Another workflow holds the lock for this post.
    DuplicateTrigger,
    /// The post is itself still queued, so the removal was a filter event.
    PostStillQueued,
    NothingQueued,
    Queued { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The work-set was already empty.
    Drained,
    /// Every queued comment was removed this run.
    Completed { removed: usize },
    /// Some comments remain; `next_attempt` is already scheduled.
    Retrying {
        removed: usize,
        remaining: usize,
        next_attempt: u32,
    },
    /// Retry budget spent with comments still queued.
    Exhausted { removed: usize, remaining: usize },
}

pub struct DeferredRemovalCoordinator {
    platform: Arc<dyn Platform>,
    store: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn JobScheduler>,
    config: TriageConfig,
}

impl DeferredRemovalCoordinator {
    pub fn new(
        platform: Arc<dyn Platform>,
        store: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn JobScheduler>,
        config: TriageConfig,
    ) -> Self {
        Self {
            platform,
            store,
            scheduler,
            config,
        }
    }

    /// Entry point for moderator action events.
    pub async fn handle_mod_action(&self, event: &ModActionEvent) -> Result<TriggerOutcome> {
        let (trigger, post_id) = match event.trigger() {
            Ok(t) => t,
            Err(ignored) => {
                let reason = match ignored {
                    IgnoredEvent::UnrelatedAction => format!("action '{}' is not handled", event.action),
                    IgnoredEvent::CommentLock => {
                        "Lock action on comment - not removing comments".to_string()
                    }
                    IgnoredEvent::MissingTargetPost => {
                        "No target post id found - not removing comments".to_string()
                    }
                };
                info!("{}", reason);
                return Ok(TriggerOutcome::Ignored { reason });
            }
        };

        let enabled = match trigger {
            TriggerKind::Removed => self.config.nuke_on_post_remove,
            TriggerKind::Locked => self.config.nuke_on_post_lock,
        };
        if !enabled {
            info!(
                "Nuke on {} is disabled - not removing comments",
                trigger.as_str()
            );
            return Ok(TriggerOutcome::Disabled);
        }

        self.handle_trigger(post_id, trigger).await
    }

    pub async fn handle_trigger(&self, post_id: &ItemId, trigger: TriggerKind) -> Result<TriggerOutcome> {
        let lock = lock_key(post_id);
        let ttl = Duration::seconds(self.config.lock_ttl_secs as i64);
        if !self.store.create_if_absent(&lock, "true", ttl).await? {
            info!("Deferred removal for {} already in progress", post_id);
            return Ok(TriggerOutcome::DuplicateTrigger);
        }

        let limit = Some(self.config.queue_fetch_limit);

        if trigger == TriggerKind::Removed {
            let queued_posts = self.platform.list_queue(ItemKind::Post, limit).await?;
            if queued_posts.iter().any(|item| &item.id == post_id) {
                self.store.delete(&lock).await?;
                info!("Post {} is in the modqueue - not removing comments", post_id);
                return Ok(TriggerOutcome::PostStillQueued);
            }
        }

        let queued_comments = self.platform.list_queue(ItemKind::Comment, limit).await?;
        let members: Vec<(String, f64)> = queued_comments
            .iter()
            .filter(|item| item.post_id() == Some(post_id))
            .map(|item| (item.id.to_string(), 0.0))
            .collect();

        if members.is_empty() {
            self.store.delete(&lock).await?;
            info!(
                "No comments in the modqueue for post {} - not removing comments",
                post_id
            );
            return Ok(TriggerOutcome::NothingQueued);
        }

        let work_key = work_queue_key(post_id);
        self.store.sorted_set_add(&work_key, &members).await?;
        self.schedule(
            &RemovalJob::first(work_key),
            Duration::seconds(self.config.initial_delay_secs as i64),
        )
        .await?;

        info!(
            "Queued {} comments for removal from the modqueue for post {}",
            members.len(),
            post_id
        );
        Ok(TriggerOutcome::Queued {
            count: members.len(),
        })
    }

    async fn schedule(&self, job: &RemovalJob, delay: Duration) -> Result<()> {
        self.scheduler
            .schedule(NUKE_QUEUE_JOB, Utc::now() + delay, serde_json::to_value(job)?)
            .await
    }

    /// One run of the removal job.
    pub async fn run_removal_job(&self, job: &RemovalJob) -> Result<JobOutcome> {
        let queued = self.store.sorted_set_range(&job.work_key).await?;
        if queued.is_empty() {
            info!(
                "No comments to remove in the nuke queue on run {}",
                job.attempt
            );
            self.store.delete(&job.work_key).await?;
            return Ok(JobOutcome::Drained);
        }

        let retry_limit = self.config.retry_limit.max(1);
        let next = (job.attempt < retry_limit).then(|| job.next());
        if let Some(next) = &next {
            // Must be in place before any removal is attempted.
            self.schedule(next, Duration::seconds(self.config.retry_delay_secs as i64))
                .await?;
        }

        let results = join_all(queued.iter().map(|member| self.remove_member(&job.work_key, member))).await;
        let removed = results.iter().filter(|ok| **ok).count();
        let remaining = results.len() - removed;
        info!("Removed {} comments from the modqueue", removed);

        if remaining == 0 {
            info!(
                "All comments removed from the modqueue - deleting key {}",
                job.work_key
            );
            self.store.delete(&job.work_key).await?;
            return Ok(JobOutcome::Completed { removed });
        }

        match next {
            Some(next) => Ok(JobOutcome::Retrying {
                removed,
                remaining,
                next_attempt: next.attempt,
            }),
            None => {
                warn!(
                    "Giving up on {} after {} attempts; {} comments left in the queue",
                    job.work_key, job.attempt, remaining
                );
                Ok(JobOutcome::Exhausted { removed, remaining })
            }
        }
    }

    async fn remove_member(&self, work_key: &str, member: &str) -> bool {
        let id = ItemId::new(member);
        if let Err(e) = self.platform.remove_by_id(&id).await {
            error!("Failed to remove comment {} - {:#}", member, e);
            return false;
        }
        match self.store.sorted_set_remove(work_key, &[member.to_string()]).await {
            Ok(()) => true,
            Err(e) => {
                error!("Removed {} but could not dequeue it - {:#}", member, e);
                false
            }
        }
    }
}
