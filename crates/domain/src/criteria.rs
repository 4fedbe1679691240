use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ItemKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemTypeSelection {
    #[default]
    All,
    Comment,
    Post,
}

impl ItemTypeSelection {
    /// Queue listings to fetch, comments first.
    pub fn kinds(&self) -> &'static [ItemKind] {
        match self {
            ItemTypeSelection::All => &[ItemKind::Comment, ItemKind::Post],
            ItemTypeSelection::Comment => &[ItemKind::Comment],
            ItemTypeSelection::Post => &[ItemKind::Post],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CriteriaError {
    #[error("'{0}' is enabled but no value was given")]
    MissingThreshold(&'static str),

    #[error("'Check Age' needs a non-negative number of hours, got {0}")]
    InvalidAge(f64),

    #[error("invalid {field} regex: {message}")]
    InvalidRegex { field: &'static str, message: String },
}

/// Snapshot of the scan form. Field names follow the form's JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub item_type: ItemTypeSelection,

    pub check_score: bool,
    pub max_score: Option<i64>,

    pub check_age: bool,
    /// Hours.
    pub min_age: Option<f64>,

    pub check_reports: bool,
    pub min_reports: Option<u32>,

    pub use_regex: bool,
    pub keywords: Option<String>,

    pub report_use_regex: bool,
    pub ignore_user_reports: bool,
    pub report_keywords: Option<String>,

    pub ignore_sticky: bool,
    pub ignore_moderator: bool,
    pub ignore_visible: bool,
    pub ignore_previously_approved: bool,

    pub reapprove_previously_approved: bool,
    pub ignore_reports_previously_approved: bool,

    /// 0 or absent scans the whole queue.
    pub scan_limit: Option<u32>,
}

impl FilterCriteria {
    /// Re-approve and ignore-reports both imply ignoring previously approved items.
    pub fn previously_approved_branch(&self) -> bool {
        self.ignore_previously_approved
            || self.reapprove_previously_approved
            || self.ignore_reports_previously_approved
    }

    pub fn effective_scan_limit(&self) -> Option<u32> {
        self.scan_limit.filter(|limit| *limit > 0)
    }

    pub fn keyword_text(&self) -> Option<&str> {
        self.keywords.as_deref().filter(|k| !k.is_empty())
    }

    pub fn report_keyword_text(&self) -> Option<&str> {
        self.report_keywords.as_deref().filter(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.check_score && self.max_score.is_none() {
            return Err(CriteriaError::MissingThreshold("Check Score"));
        }
        if self.check_age {
            match self.min_age {
                None => return Err(CriteriaError::MissingThreshold("Check Age")),
                Some(hours) if !hours.is_finite() || hours < 0.0 => {
                    return Err(CriteriaError::InvalidAge(hours))
                }
                Some(_) => {}
            }
        }
        if self.check_reports && self.min_reports.is_none() {
            return Err(CriteriaError::MissingThreshold("Check Reports"));
        }
        Ok(())
    }
}
