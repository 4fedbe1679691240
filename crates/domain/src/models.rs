use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const COMMENT_PREFIX: &str = "t1_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Post => "post",
            ItemKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fullname of a queue item, e.g. `t1_abc123` (comment) or `t3_xyz` (post).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix alone decides the kind: `t1_` is a comment, anything else a post.
    pub fn kind(&self) -> ItemKind {
        if self.0.starts_with(COMMENT_PREFIX) {
            ItemKind::Comment
        } else {
            ItemKind::Post
        }
    }

    /// Id without the kind prefix, as shown in log lines.
    pub fn short(&self) -> &str {
        self.0.split_once('_').map(|(_, rest)| rest).unwrap_or(&self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind-specific part of a queue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemContent {
    Post {
        title: String,
        #[serde(default)]
        body: String,
    },
    Comment {
        #[serde(default)]
        body: String,
        post_id: ItemId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub author_name: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_stickied: bool,
    #[serde(default)]
    pub is_spam: bool,
    #[serde(default)]
    pub is_removed: bool,
    #[serde(default)]
    pub removed_by_category: Option<String>,
    #[serde(default)]
    pub removal_reason: Option<String>,
    #[serde(default)]
    pub banned_by: Option<String>,
    #[serde(default)]
    pub distinguished_by: Option<String>,
    #[serde(default, alias = "number_of_reports")]
    pub num_reports: u32,
    #[serde(default)]
    pub user_report_reasons: Vec<String>,
    #[serde(default)]
    pub mod_report_reasons: Vec<String>,
    #[serde(flatten)]
    pub content: ItemContent,
}

impl QueueItem {
    pub fn kind(&self) -> ItemKind {
        match self.content {
            ItemContent::Post { .. } => ItemKind::Post,
            ItemContent::Comment { .. } => ItemKind::Comment,
        }
    }

    pub fn body(&self) -> &str {
        match &self.content {
            ItemContent::Post { body, .. } | ItemContent::Comment { body, .. } => body,
        }
    }

    /// Text searched by the keyword filter: `title\nbody` for posts, the body for comments.
    pub fn searchable_text(&self) -> String {
        match &self.content {
            ItemContent::Post { title, body } => format!("{}\n{}", title, body),
            ItemContent::Comment { body, .. } => body.clone(),
        }
    }

    pub fn permalink_or_id(&self) -> &str {
        if self.permalink.is_empty() {
            self.id.as_str()
        } else {
            &self.permalink
        }
    }

    /// Parent post of a comment.
    pub fn post_id(&self) -> Option<&ItemId> {
        match &self.content {
            ItemContent::Comment { post_id, .. } => Some(post_id),
            ItemContent::Post { .. } => None,
        }
    }

    /// Report reasons joined by newlines, moderator reports after user reports.
    pub fn report_text(&self, include_user_reports: bool) -> String {
        let mut reports: Vec<&str> = Vec::new();
        if include_user_reports {
            reports.extend(self.user_report_reasons.iter().map(String::as_str));
        }
        reports.extend(self.mod_report_reasons.iter().map(String::as_str));
        reports.join("\n")
    }

    pub fn is_moderator_item(&self, moderators: &HashSet<String>) -> bool {
        moderators.contains(&self.author_name)
            || self
                .distinguished_by
                .as_deref()
                .is_some_and(|d| !d.is_empty())
    }

    /// An item is visible unless a filter or a removal has already hidden it.
    pub fn is_visible(&self) -> bool {
        let automod_filtered = self.removed_by_category.as_deref() == Some("automod_filtered");
        let banned = matches!(self.banned_by.as_deref(), Some("AutoModerator") | Some("true"));
        let legal_removal = self.removal_reason.as_deref() == Some("legal") && !self.is_approved;
        !(self.is_spam || self.is_removed || automod_filtered || banned || legal_removal)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    pub fn post(id: &str, title: &str, body: &str) -> QueueItem {
        QueueItem {
            id: ItemId::new(id),
            author_name: "poster".into(),
            score: 1,
            created_at: now() - chrono::Duration::hours(1),
            permalink: format!("/r/test/comments/{}", id),
            is_approved: false,
            is_stickied: false,
            is_spam: true,
            is_removed: false,
            removed_by_category: None,
            removal_reason: None,
            banned_by: None,
            distinguished_by: None,
            num_reports: 1,
            user_report_reasons: vec![],
            mod_report_reasons: vec![],
            content: ItemContent::Post {
                title: title.into(),
                body: body.into(),
            },
        }
    }

    pub fn comment(id: &str, post_id: &str, body: &str) -> QueueItem {
        QueueItem {
            content: ItemContent::Comment {
                body: body.into(),
                post_id: ItemId::new(post_id),
            },
            author_name: "commenter".into(),
            ..post(id, "", "")
        }
    }
}
