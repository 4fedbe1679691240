//! Per-item checks. Each check returns `Ok(())` when the item may proceed and
//! `Err(reason)` with the text used in the "Skipping ..." log line otherwise.

use chrono::{DateTime, Duration, Utc};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

use crate::criteria::CriteriaError;
use crate::format::{format_age, item_counts, CountEntry};
use crate::models::QueueItem;

pub type Check = Result<(), String>;

/// Reason logged for every item caught by the previously-approved branch.
pub const PREVIOUSLY_APPROVED: &str = "it was previously approved";

/// Compiled keyword filter: one case-insensitive regex, or newline-separated
/// plain substrings matched case-insensitively with OR semantics.
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    Regex(Regex),
    Plain(Vec<String>),
}

impl KeywordMatcher {
    pub fn new(keywords: &str, use_regex: bool, field: &'static str) -> Result<Self, CriteriaError> {
        if use_regex {
            let regex = RegexBuilder::new(keywords)
                .case_insensitive(true)
                .build()
                .map_err(|e| CriteriaError::InvalidRegex {
                    field,
                    message: e.to_string(),
                })?;
            return Ok(Self::Regex(regex));
        }
        // Blank lines would match everything.
        let words = keywords
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        Ok(Self::Plain(words))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            KeywordMatcher::Regex(regex) => regex.is_match(text),
            KeywordMatcher::Plain(words) => {
                let haystack = text.to_lowercase();
                words.iter().any(|word| haystack.contains(word.as_str()))
            }
        }
    }
}

pub fn score(item: &QueueItem, max_score: i64) -> Check {
    if item.score <= max_score {
        Ok(())
    } else {
        Err(format!(
            "the score is too high {}",
            item_counts(&[CountEntry::Count("Score", item.score)])
        )
        .trim_end()
        .to_string())
    }
}

pub fn age(item: &QueueItem, min_age_hours: f64, now: DateTime<Utc>) -> Check {
    let millis = (min_age_hours * 3_600_000.0).max(0.0) as i64;
    let min_age = Duration::try_milliseconds(millis).unwrap_or(Duration::MAX);
    let item_age = now - item.created_at;
    if item_age >= min_age {
        Ok(())
    } else {
        let rendered = format_age(item_age);
        Err(format!(
            "the {} isn't old enough {}",
            item.kind(),
            item_counts(&[CountEntry::Value("Age", &rendered)])
        ))
    }
}

pub fn reports(item: &QueueItem, min_reports: u32) -> Check {
    if item.num_reports >= min_reports {
        Ok(())
    } else {
        Err(format!(
            "report count is too low {}",
            item_counts(&[CountEntry::Count("Reports", item.num_reports as i64)])
        )
        .trim_end()
        .to_string())
    }
}

pub fn not_stickied(item: &QueueItem) -> Check {
    if item.is_stickied {
        Err("it is stickied".into())
    } else {
        Ok(())
    }
}

pub fn keywords(item: &QueueItem, matcher: &KeywordMatcher) -> Check {
    if matcher.is_match(&item.searchable_text()) {
        Ok(())
    } else {
        Err("the title/body doesn't contain the specified keywords".into())
    }
}

pub fn report_keywords(item: &QueueItem, matcher: &KeywordMatcher, ignore_user_reports: bool) -> Check {
    if matcher.is_match(&item.report_text(!ignore_user_reports)) {
        Ok(())
    } else {
        Err("its reports don't contain the specified keywords".into())
    }
}

/// Combined moderator/visibility check: fails if either enabled condition holds.
pub fn moderator_or_visible(
    item: &QueueItem,
    moderators: &HashSet<String>,
    ignore_moderator: bool,
    ignore_visible: bool,
) -> Check {
    if ignore_moderator && item.is_moderator_item(moderators) {
        return Err("the author is a moderator or distinguished".into());
    }
    if ignore_visible && item.is_visible() {
        return Err("it is visible".into());
    }
    Ok(())
}

pub fn not_previously_approved(item: &QueueItem) -> Check {
    if item.is_approved {
        Err(PREVIOUSLY_APPROVED.into())
    } else {
        Ok(())
    }
}
