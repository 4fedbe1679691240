//! Human-readable rendering of counts, ages and lists used in log lines and
//! confirmation prompts.

use chrono::Duration;

use crate::batch::{ActionBatch, ActionKind, ActionResult, KindCounts};

/// One entry of a parenthesised count list.
pub enum CountEntry<'a> {
    Count(&'a str, i64),
    Value(&'a str, &'a str),
}

/// Renders `(Name: 1, Other: value)`, omitting zero counts and empty values.
/// Returns an empty string when nothing is left to show.
pub fn item_counts(entries: &[CountEntry<'_>]) -> String {
    let elements: Vec<String> = entries
        .iter()
        .filter_map(|entry| match entry {
            CountEntry::Count(name, count) if *count != 0 => Some(format!("{}: {}", name, count)),
            CountEntry::Value(name, value) if !value.is_empty() => {
                Some(format!("{}: {}", name, value))
            }
            _ => None,
        })
        .collect();
    if elements.is_empty() {
        String::new()
    } else {
        format!("({})", elements.join(", "))
    }
}

/// `a`, `a and b`, `a, b, and c`.
pub fn human_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect();
    match items.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{} and {}", first, second),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

pub fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        format!("{}s", singular)
    }
}

fn unit(value: i64, name: &str) -> String {
    format!("{} {}{}", value, name, if value == 1 { "" } else { "s" })
}

/// Renders a duration with the coarsest units only: days always when present,
/// hours while under two days, minutes only below one hour and seconds only
/// below one minute.
pub fn format_duration(age: Duration) -> String {
    let total = age.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total / 3_600) % 24;
    let minutes = (total / 60) % 60;
    let seconds = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(unit(days, "day"));
    }
    if hours > 0 && days < 2 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 && days == 0 && hours == 0 {
        parts.push(unit(minutes, "minute"));
    }
    if seconds > 0 && days == 0 && hours == 0 && minutes == 0 {
        parts.push(unit(seconds, "second"));
    }
    if parts.is_empty() {
        return unit(0, "second");
    }
    parts.join(", ")
}

pub fn format_age(age: Duration) -> String {
    format!("{} ago", format_duration(age))
}

fn counts_suffix(counts: &KindCounts, singular_names: bool) -> String {
    let post_name = if singular_names { plural(counts.posts, "Post") } else { "Posts".into() };
    let comment_name = if singular_names {
        plural(counts.comments, "Comment")
    } else {
        "Comments".into()
    };
    item_counts(&[
        CountEntry::Count(&post_name, counts.posts as i64),
        CountEntry::Count(&comment_name, counts.comments as i64),
    ])
}

fn join_nonempty(head: String, tail: String) -> String {
    if tail.is_empty() {
        head
    } else {
        format!("{} {}", head, tail)
    }
}

/// Confirmation prompt for a pending batch.
pub fn describe_batch(batch: &ActionBatch) -> String {
    let entries: Vec<String> = ActionKind::ALL
        .iter()
        .filter_map(|action| {
            let list = batch.list(*action);
            if list.is_empty() {
                return None;
            }
            Some(join_nonempty(
                format!(
                    "{} {} to {}",
                    list.len(),
                    plural(list.len(), "item"),
                    action.imperative()
                ),
                counts_suffix(&list.counts, false),
            ))
        })
        .collect();
    format!(
        "Found {}. Are you sure you want to nuke these items?",
        human_list(&entries)
    )
}

/// `Successfully removed 3 items (Post: 1, Comments: 2)`, or `None` if nothing succeeded.
pub fn success_line(action: ActionKind, result: &ActionResult) -> Option<String> {
    let total = result.succeeded();
    if total == 0 {
        return None;
    }
    let counts = KindCounts {
        posts: result.post_count,
        comments: result.comment_count,
    };
    Some(join_nonempty(
        format!(
            "Successfully {} {} {}",
            action.past(),
            total,
            plural(total, "item")
        ),
        counts_suffix(&counts, true),
    ))
}

/// `Failed to remove 2 items and re-approve 1 item`, or `None` if nothing failed.
pub fn failure_message(results: &[(ActionKind, ActionResult)]) -> Option<String> {
    let messages: Vec<String> = results
        .iter()
        .filter(|(_, result)| result.failed_count > 0)
        .map(|(action, result)| {
            format!(
                "{} {} {}",
                action.imperative(),
                result.failed_count,
                plural(result.failed_count, "item")
            )
        })
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(format!("Failed to {}", human_list(&messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn minutes_suppress_seconds() {
        assert_eq!(format_duration(Duration::milliseconds(90_000)), "1 minute");
    }

    #[test]
    fn two_days_suppress_hours() {
        let age = Duration::days(2) + Duration::hours(3);
        assert_eq!(format_duration(age), "2 days");
    }

    #[test]
    fn one_day_keeps_hours() {
        let age = Duration::days(1) + Duration::hours(3) + Duration::minutes(5);
        assert_eq!(format_duration(age), "1 day, 3 hours");
        assert_eq!(format_age(age), "1 day, 3 hours ago");
    }

    #[test]
    fn seconds_only_below_a_minute() {
        assert_eq!(format_duration(Duration::seconds(42)), "42 seconds");
        assert_eq!(format_duration(Duration::seconds(-5)), "0 seconds");
    }

    #[test]
    fn human_list_shapes() {
        assert_eq!(human_list::<&str>(&[]), "");
        assert_eq!(human_list(&["a"]), "a");
        assert_eq!(human_list(&["a", "b"]), "a and b");
        assert_eq!(human_list(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn item_counts_skips_empty_entries() {
        assert_eq!(
            item_counts(&[CountEntry::Count("Score", 10)]),
            "(Score: 10)"
        );
        assert_eq!(item_counts(&[CountEntry::Count("Score", 0)]), "");
        assert_eq!(
            item_counts(&[
                CountEntry::Count("Posts", 0),
                CountEntry::Value("Age", "2 days ago"),
            ]),
            "(Age: 2 days ago)"
        );
    }

    #[test]
    fn describes_batch() {
        let mut batch = ActionBatch::default();
        batch.to_remove.push("t3_a".into(), ItemKind::Post);
        batch.to_remove.push("t1_b".into(), ItemKind::Comment);
        batch.to_remove.push("t1_c".into(), ItemKind::Comment);
        batch.to_approve.push("t1_d".into(), ItemKind::Comment);
        assert_eq!(
            describe_batch(&batch),
            "Found 3 items to remove (Posts: 1, Comments: 2) and 1 item to re-approve (Comments: 1). \
             Are you sure you want to nuke these items?"
        );
    }

    #[test]
    fn success_and_failure_lines() {
        let removed = ActionResult {
            post_count: 1,
            comment_count: 2,
            failed_count: 2,
        };
        let approved = ActionResult {
            post_count: 0,
            comment_count: 0,
            failed_count: 1,
        };
        assert_eq!(
            success_line(ActionKind::Remove, &removed).as_deref(),
            Some("Successfully removed 3 items (Post: 1, Comments: 2)")
        );
        assert_eq!(success_line(ActionKind::Approve, &approved), None);
        assert_eq!(
            failure_message(&[
                (ActionKind::Remove, removed),
                (ActionKind::Approve, approved),
                (ActionKind::SuppressReports, ActionResult::default()),
            ])
            .as_deref(),
            Some("Failed to remove 2 items and re-approve 1 item")
        );
    }
}
