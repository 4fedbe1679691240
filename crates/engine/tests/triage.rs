mod common;

use common::{comment, post, FakePlatform};
use domain::{ActionKind, FilterCriteria, ItemId, ItemTypeSelection};
use engine::{ActionDispatcher, PendingActionStore, PendingScope, ScanError, Triage};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use storage::Db;

struct Harness {
    platform: Arc<FakePlatform>,
    pending: PendingActionStore,
    triage: Triage,
}

async fn harness() -> Harness {
    let platform = Arc::new(FakePlatform::new());
    let db = Db::in_memory().await.unwrap();
    let pending = PendingActionStore::new(Arc::new(db));
    let triage = Triage::new(
        platform.clone(),
        pending.clone(),
        ActionDispatcher::new(3),
        "pics",
    );
    Harness {
        platform,
        pending,
        triage,
    }
}

#[tokio::test]
async fn high_score_item_is_excluded_with_reason() {
    let h = harness().await;
    let mut popular = post("t3_hot");
    popular.score = 10;
    h.platform.push(popular);
    h.platform.push(post("t3_cold"));

    let report = h
        .triage
        .scan(
            "mod",
            &FilterCriteria {
                check_score: true,
                max_score: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.batch.to_remove.ids, vec![ItemId::new("t3_cold")]);
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0]
        .to_string()
        .contains("the score is too high (Score: 10)"));
}

#[tokio::test]
async fn scan_persists_batch_and_describes_it() {
    let h = harness().await;
    h.platform.push(post("t3_a"));
    h.platform.push(comment("t1_b", "t3_a"));
    let mut approved = post("t3_c");
    approved.is_approved = true;
    h.platform.push(approved);

    let report = h
        .triage
        .scan(
            "mod",
            &FilterCriteria {
                reapprove_previously_approved: true,
                ignore_reports_previously_approved: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        report.message(),
        "Found 2 items to remove (Posts: 1, Comments: 1), 1 item to re-approve (Posts: 1), \
         and 1 item to ignore reports on (Posts: 1). Are you sure you want to nuke these items?"
    );
    let saved = h
        .pending
        .load(&PendingScope::new("mod", "pics"))
        .await
        .unwrap();
    assert_eq!(saved, report.batch);
}

#[tokio::test]
async fn empty_scan_saves_nothing() {
    let h = harness().await;
    let mut sticky = post("t3_a");
    sticky.is_stickied = true;
    h.platform.push(sticky);

    let report = h
        .triage
        .scan(
            "mod",
            &FilterCriteria {
                ignore_sticky: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(report.description, None);
    assert_eq!(report.message(), "No items found to nuke");
    assert!(h
        .pending
        .load(&PendingScope::new("mod", "pics"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn scan_without_posts_permission_is_denied() {
    let h = harness().await;
    h.platform.grant("helper", &["wiki", "flair"]);
    h.platform.push(post("t3_a"));

    let err = h
        .triage
        .scan("helper", &FilterCriteria::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::PermissionDenied));

    h.platform.grant("helper", &["all"]);
    assert!(h.triage.scan("helper", &FilterCriteria::default()).await.is_ok());
}

#[tokio::test]
async fn failed_queue_fetch_aborts_without_persisting() {
    let h = harness().await;
    h.platform.push(post("t3_a"));
    h.platform.break_queue();

    let err = h
        .triage
        .scan("mod", &FilterCriteria::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::Queue(_)));
    assert_eq!(err.to_string(), "An error occurred scanning the modqueue");
    assert!(h
        .pending
        .load(&PendingScope::new("mod", "pics"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn invalid_regex_is_reported_before_fetching() {
    let h = harness().await;
    let err = h
        .triage
        .scan(
            "mod",
            &FilterCriteria {
                use_regex: true,
                keywords: Some("(".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidCriteria(_)));
}

#[tokio::test]
async fn item_type_and_scan_limit_bound_the_scan() {
    let h = harness().await;
    for i in 0..5 {
        h.platform.push(comment(&format!("t1_{}", i), "t3_p"));
    }
    h.platform.push(post("t3_p"));

    let report = h
        .triage
        .scan(
            "mod",
            &FilterCriteria {
                item_type: ItemTypeSelection::Comment,
                scan_limit: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(report.scanned, 3);
    assert_eq!(report.batch.to_remove.counts.posts, 0);
}

#[tokio::test]
async fn confirm_applies_batch_and_summarises() {
    let h = harness().await;
    h.platform.push(post("t3_a"));
    h.platform.push(comment("t1_b", "t3_a"));
    h.platform.push(comment("t1_c", "t3_a"));
    let mut approved = comment("t1_d", "t3_a");
    approved.is_approved = true;
    h.platform.push(approved);
    h.platform.fail_always("t1_c");

    h.triage
        .scan(
            "mod",
            &FilterCriteria {
                reapprove_previously_approved: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = h.triage.confirm("mod").await.unwrap();
    assert_eq!(report.unresolved, 0);
    assert_eq!(report.result(ActionKind::Remove).succeeded(), 2);
    assert_eq!(report.result(ActionKind::Remove).failed_count, 1);
    assert_eq!(report.result(ActionKind::Approve).comment_count, 1);
    assert_eq!(
        report.messages,
        vec![
            "Successfully removed 2 items (Post: 1, Comment: 1)".to_string(),
            "Successfully re-approved 1 item (Comment: 1)".to_string(),
        ]
    );
    assert_eq!(report.failure.as_deref(), Some("Failed to remove 1 item"));

    // The batch is consumed by the confirmation.
    let again = h.triage.confirm("mod").await.unwrap();
    assert_eq!(again.results.iter().map(|(_, r)| r.succeeded()).sum::<usize>(), 0);
}

#[tokio::test]
async fn confirm_skips_items_that_no_longer_resolve() {
    let h = harness().await;
    let pending_scope = PendingScope::new("mod", "pics");
    h.platform.push(post("t3_a"));
    h.triage.scan("mod", &FilterCriteria::default()).await.unwrap();

    let mut batch = h.pending.load(&pending_scope).await.unwrap();
    batch.to_remove.push(ItemId::new("t3_gone"), domain::ItemKind::Post);
    h.pending.save(&pending_scope, &batch).await.unwrap();

    let report = h.triage.confirm("mod").await.unwrap();
    assert_eq!(report.unresolved, 1);
    assert_eq!(report.result(ActionKind::Remove).post_count, 1);
}
