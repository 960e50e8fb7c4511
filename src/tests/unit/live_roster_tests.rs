//! Progressive Loading Unit Tests
//!
//! `LiveRoster` publishes each partition independently, so searches see
//! partial data while slower partitions are still loading.

use std::sync::Arc;
use std::time::Duration;

use crate::core::roster::{
    LiveRoster, LoadStatus, PartitionKey, Query, QueryResolver, RosterSource, DEFAULT_RESULT_CAP,
};
use crate::tests::common::{roster_2021, roster_2022, sample_initials, StaticSource};

fn shared(source: StaticSource) -> Arc<dyn RosterSource> {
    Arc::new(source)
}

#[tokio::test]
async fn test_wait_until_loaded_sees_everything() {
    let source = StaticSource::new()
        .with_partition(PartitionKey::Y2021, roster_2021())
        .with_partition(PartitionKey::Y2022, roster_2022())
        .with_initials(sample_initials());

    let roster = LiveRoster::spawn(shared(source), &PartitionKey::ALL);
    let before = roster.snapshot();
    let snapshot = roster.wait_until_loaded().await;

    assert!(!roster.is_loading());
    assert_eq!(snapshot.store().partition_count(), 4);
    assert_eq!(snapshot.store().total_records(), 5);
    assert_eq!(snapshot.initials().len(), 9);
    assert!(snapshot.revision() > before.revision());

    let progress = roster.progress();
    assert!(!progress.is_loading());
    assert_eq!(
        progress.partitions.get(&PartitionKey::Y2021),
        Some(&LoadStatus::Loaded { entries: 3 })
    );
    assert_eq!(progress.initials, LoadStatus::Loaded { entries: 9 });
}

#[tokio::test]
async fn test_slow_partition_does_not_block_others() {
    let (source, gate) = StaticSource::new()
        .with_partition(PartitionKey::Y2021, roster_2021())
        .with_partition(PartitionKey::Y2022, roster_2022())
        .with_initials(sample_initials())
        .hold(PartitionKey::Y2022);

    let roster = LiveRoster::spawn(shared(source), &[PartitionKey::Y2021, PartitionKey::Y2022]);

    // Wait for the unblocked loads to land.
    tokio::time::timeout(Duration::from_secs(5), async {
        while roster.progress().pending_partitions() != vec![PartitionKey::Y2022]
            || roster.progress().initials.is_pending()
        {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("2021 and initials should load while 2022 is held");

    assert!(roster.is_loading());
    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 16);
    let partial = resolver.search(&Query::new("张三"), &roster.snapshot());
    assert_eq!(partial.len(), 1);
    assert_eq!(partial.results[0].student_id, "542112345678");

    gate.notify_one();
    let snapshot = roster.wait_until_loaded().await;

    // The new revision bypasses the memoized partial result.
    let full = resolver.search(&Query::new("张三"), &snapshot);
    assert_eq!(full.len(), 2);
    assert_eq!(full.results[1].name, "张三丰");
}

#[tokio::test]
async fn test_failures_publish_empty_collections() {
    let source = StaticSource::new()
        .with_partition(PartitionKey::Y2021, roster_2021())
        .failing(PartitionKey::Y2022);

    let roster = LiveRoster::spawn(shared(source), &[PartitionKey::Y2021, PartitionKey::Y2022]);
    let snapshot = roster.wait_until_loaded().await;

    assert_eq!(snapshot.store().partition(PartitionKey::Y2022).map(<[_]>::len), Some(0));
    assert!(snapshot.initials().is_empty());

    let progress = roster.progress();
    assert_eq!(progress.failed_partitions(), vec![PartitionKey::Y2022]);
    assert!(matches!(progress.initials, LoadStatus::Failed { .. }));

    // Initials search degrades to no results instead of failing.
    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 0);
    assert!(resolver.search(&Query::new("zhang"), &snapshot).is_empty());
    assert_eq!(resolver.search(&Query::new("王五"), &snapshot).len(), 1);
}

#[tokio::test]
async fn test_panicking_load_still_completes() {
    let source = StaticSource::new()
        .with_partition(PartitionKey::Y2021, roster_2021())
        .panicking(PartitionKey::Y2023)
        .with_initials(sample_initials());

    let roster = LiveRoster::spawn(shared(source), &[PartitionKey::Y2021, PartitionKey::Y2023]);
    let snapshot = tokio::time::timeout(Duration::from_secs(5), roster.wait_until_loaded())
        .await
        .expect("a panicking load must not leave the roster loading forever");

    assert!(!roster.is_loading());
    assert_eq!(snapshot.store().partition(PartitionKey::Y2023).map(<[_]>::len), Some(0));
    assert_eq!(snapshot.store().total_records(), 3);
    assert_eq!(roster.progress().failed_partitions(), vec![PartitionKey::Y2023]);
}

#[tokio::test]
async fn test_separate_rosters_do_not_share_memo_entries() {
    let first = LiveRoster::spawn(
        shared(StaticSource::new().with_partition(PartitionKey::Y2021, roster_2021())),
        &[PartitionKey::Y2021],
    );
    let second = LiveRoster::spawn(
        shared(StaticSource::new().with_partition(PartitionKey::Y2022, roster_2022())),
        &[PartitionKey::Y2022],
    );
    let first = first.wait_until_loaded().await;
    let second = second.wait_until_loaded().await;

    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 16);
    let a = resolver.search(&Query::new("张三"), &first);
    let b = resolver.search(&Query::new("张三"), &second);

    assert_eq!(a.results[0].student_id, "542112345678");
    assert_eq!(b.results[0].student_id, "542212340001");
}

#[tokio::test]
async fn test_duplicate_keys_load_once() {
    let source = StaticSource::new().with_partition(PartitionKey::Y2021, roster_2021());

    let roster = LiveRoster::spawn(
        shared(source),
        &[PartitionKey::Y2021, PartitionKey::Y2021, PartitionKey::Y2021],
    );
    let snapshot = roster.wait_until_loaded().await;

    assert_eq!(snapshot.store().partition_count(), 1);
    assert_eq!(snapshot.store().total_records(), 3);
    assert_eq!(roster.progress().partitions.len(), 1);
}

#[test]
fn test_status_serializes_with_state_tag() {
    let json = serde_json::to_value(LoadStatus::Loaded { entries: 3 }).unwrap();
    assert_eq!(json, serde_json::json!({"state": "loaded", "entries": 3}));
    let json = serde_json::to_value(LoadStatus::Pending).unwrap();
    assert_eq!(json, serde_json::json!({"state": "pending"}));
}
