use serde::{Deserialize, Serialize};

use crate::models::ItemId;

/// A moderator action reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModActionEvent {
    pub action: String,
    #[serde(default)]
    pub target_post_id: Option<ItemId>,
    #[serde(default)]
    pub target_comment_id: Option<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Removed,
    Locked,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Removed => "remove",
            TriggerKind::Locked => "lock",
        }
    }
}

/// Why an event does not start a deferred removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredEvent {
    UnrelatedAction,
    CommentLock,
    MissingTargetPost,
}

impl ModActionEvent {
    /// Maps the event onto a post-level trigger.
    pub fn trigger(&self) -> Result<(TriggerKind, &ItemId), IgnoredEvent> {
        let kind = match self.action.as_str() {
            "removelink" | "spamlink" => TriggerKind::Removed,
            "lock" => {
                if self.target_comment_id.is_some() {
                    return Err(IgnoredEvent::CommentLock);
                }
                TriggerKind::Locked
            }
            _ => return Err(IgnoredEvent::UnrelatedAction),
        };
        let post_id = self
            .target_post_id
            .as_ref()
            .ok_or(IgnoredEvent::MissingTargetPost)?;
        Ok((kind, post_id))
    }
}
