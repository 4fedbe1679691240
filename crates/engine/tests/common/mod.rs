#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use domain::{ActionKind, ItemContent, ItemId, ItemKind, QueueItem};
use engine::{ActionError, ItemMutator, ItemResolver, QueueSource};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory moderation platform with scripted failures.
#[derive(Default)]
pub struct FakePlatform {
    queue: Mutex<Vec<QueueItem>>,
    moderators: Mutex<HashSet<String>>,
    permissions: Mutex<HashMap<String, Vec<String>>>,
    /// Remaining failures per item; `u32::MAX` fails forever.
    failures: Mutex<HashMap<ItemId, u32>>,
    calls: Mutex<Vec<(ActionKind, ItemId)>>,
    fail_queue_fetch: Mutex<bool>,
}

impl FakePlatform {
    pub fn new() -> Self {
        let platform = Self::default();
        platform.grant("mod", &["posts"]);
        platform
    }

    pub fn push(&self, item: QueueItem) {
        self.queue.lock().unwrap().push(item);
    }

    pub fn grant(&self, actor: &str, permissions: &[&str]) {
        self.permissions.lock().unwrap().insert(
            actor.to_string(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn add_moderator(&self, name: &str) {
        self.moderators.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_always(&self, id: &str) {
        self.failures.lock().unwrap().insert(ItemId::new(id), u32::MAX);
    }

    pub fn fail_times(&self, id: &str, times: u32) {
        self.failures.lock().unwrap().insert(ItemId::new(id), times);
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn break_queue(&self) {
        *self.fail_queue_fetch.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<(ActionKind, ItemId)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, action: ActionKind) -> usize {
        self.calls().iter().filter(|(a, _)| *a == action).count()
    }

    fn record(&self, action: ActionKind, id: &ItemId) -> Result<(), ActionError> {
        self.calls.lock().unwrap().push((action, id.clone()));
        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(id) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(anyhow!("platform error for {}", id).into());
            }
        }
        if action == ActionKind::Remove {
            self.queue.lock().unwrap().retain(|item| &item.id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl QueueSource for FakePlatform {
    async fn list_queue(&self, kind: ItemKind, limit: Option<u32>) -> Result<Vec<QueueItem>> {
        if *self.fail_queue_fetch.lock().unwrap() {
            return Err(anyhow!("modqueue listing unavailable"));
        }
        let items = self
            .queue
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.kind() == kind)
            .take(limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(items)
    }

    async fn list_moderators(&self) -> Result<HashSet<String>> {
        Ok(self.moderators.lock().unwrap().clone())
    }

    async fn moderator_permissions(&self, actor: &str) -> Result<Vec<String>> {
        Ok(self
            .permissions
            .lock()
            .unwrap()
            .get(actor)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ItemMutator for FakePlatform {
    async fn remove(&self, item: &QueueItem) -> Result<(), ActionError> {
        self.record(ActionKind::Remove, &item.id)
    }

    async fn approve(&self, item: &QueueItem) -> Result<(), ActionError> {
        self.record(ActionKind::Approve, &item.id)
    }

    async fn suppress_reports(&self, item: &QueueItem) -> Result<(), ActionError> {
        if item.kind() == ItemKind::Comment {
            return Err(ActionError::Unsupported {
                action: ActionKind::SuppressReports,
                kind: ItemKind::Comment,
            });
        }
        self.record(ActionKind::SuppressReports, &item.id)
    }

    async fn remove_by_id(&self, id: &ItemId) -> Result<(), ActionError> {
        self.record(ActionKind::Remove, id)
    }
}

#[async_trait]
impl ItemResolver for FakePlatform {
    async fn resolve(&self, id: &ItemId) -> Result<QueueItem> {
        self.queue
            .lock()
            .unwrap()
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("{} not found", id))
    }
}

pub fn post(id: &str) -> QueueItem {
    QueueItem {
        id: ItemId::new(id),
        author_name: "poster".into(),
        score: 1,
        created_at: Utc::now() - Duration::hours(2),
        permalink: String::new(),
        is_approved: false,
        is_stickied: false,
        is_spam: false,
        is_removed: false,
        removed_by_category: None,
        removal_reason: None,
        banned_by: None,
        distinguished_by: None,
        num_reports: 1,
        user_report_reasons: vec![],
        mod_report_reasons: vec![],
        content: ItemContent::Post {
            title: format!("title of {}", id),
            body: String::new(),
        },
    }
}

pub fn comment(id: &str, post_id: &str) -> QueueItem {
    QueueItem {
        author_name: "commenter".into(),
        content: ItemContent::Comment {
            body: format!("body of {}", id),
            post_id: ItemId::new(post_id),
        },
        ..post(id)
    }
}
