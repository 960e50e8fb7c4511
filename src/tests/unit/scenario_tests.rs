//! End-to-end lookup scenarios over the sample rosters.

use rstest::rstest;

use crate::core::roster::{
    search, DatasetStore, InitialsTable, PartitionKey, PartitionRestriction, Query, QueryResolver,
    RosterSnapshot, SearchMode, Strategy, DEFAULT_RESULT_CAP,
};
use crate::tests::common::{many_namesakes, sample_initials, sample_store, student};

fn ids(results: &[crate::core::roster::StudentRecord]) -> Vec<&str> {
    results.iter().map(|r| r.student_id.as_str()).collect()
}

#[test]
fn test_long_digit_run_is_partial_id() {
    let store = DatasetStore::new().with_partition(
        PartitionKey::Y2021,
        vec![
            student("X54210112345678Y", "甲", ""),
            student("542101123456", "乙", ""),
        ],
    );
    let query = Query::new("54210112345678");
    assert_eq!(query.strategy(), Some(Strategy::PartialId));

    let results = search(&query, &store, &InitialsTable::empty(), DEFAULT_RESULT_CAP);
    assert_eq!(ids(&results), vec!["X54210112345678Y"]);
}

#[test]
fn test_name_query_matches_substring_across_partitions() {
    let results = search(&Query::new("张三"), &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP);
    assert_eq!(ids(&results), vec!["542112345678", "542212340001"]);
}

#[test]
fn test_initials_are_substring_not_acronym() {
    let table = InitialsTable::from_pairs([("张", "zhang"), ("三", "san")]);
    let store = DatasetStore::new().with_partition(PartitionKey::Y2021, vec![student("542112345678", "张三", "")]);

    assert!(search(&Query::new("zs"), &store, &table, DEFAULT_RESULT_CAP).is_empty());
    assert_eq!(search(&Query::new("gsa"), &store, &table, DEFAULT_RESULT_CAP).len(), 1);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn test_blank_query_returns_nothing(#[case] raw: &str) {
    let query = Query::new(raw);
    assert!(query.is_empty());
    assert!(search(&query, &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP).is_empty());

    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 16);
    let outcome = resolver.search(&query, &RosterSnapshot::new(sample_store(), sample_initials()));
    assert!(outcome.is_empty());
    assert_eq!(outcome.strategy, None);
    assert_eq!(resolver.cache_stats().entries, 0);
}

#[test]
fn test_exact_id_stops_at_one_per_partition() {
    let results = search(&Query::new("542112345678"), &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP);
    assert_eq!(ids(&results), vec!["542112345678"]);
}

#[test]
fn test_duplicate_across_partitions_keeps_earliest() {
    let store = DatasetStore::new()
        .with_partition(PartitionKey::Y2022, vec![student("542100000001", "张伟", "转专业")])
        .with_partition(PartitionKey::Y2021, vec![student("542100000001", "张伟", "原班级")]);

    let results = search(&Query::new("张伟"), &store, &InitialsTable::empty(), DEFAULT_RESULT_CAP);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].class_name, "原班级");
}

#[test]
fn test_result_cap_across_partitions() {
    let store = DatasetStore::new()
        .with_partition(PartitionKey::Y2021, many_namesakes("5421", 20))
        .with_partition(PartitionKey::Y2022, many_namesakes("5422", 20));

    let results = search(&Query::new("张伟"), &store, &InitialsTable::empty(), DEFAULT_RESULT_CAP);
    assert_eq!(results.len(), 30);
    assert_eq!(results[19].student_id, "542100000019");
    assert_eq!(results[20].student_id, "542200000000");
}

#[rstest]
#[case(PartitionRestriction::All, vec!["542112345678", "542212340001"])]
#[case(PartitionRestriction::Only(PartitionKey::Y2022), vec!["542212340001"])]
#[case(PartitionRestriction::Only(PartitionKey::Y2024), vec![])]
fn test_partition_restriction(#[case] restriction: PartitionRestriction, #[case] expected: Vec<&str>) {
    let query = Query::new("张三").in_partitions(restriction);
    let results = search(&query, &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP);
    assert_eq!(ids(&results), expected);
}

#[test]
fn test_full_text_mode_matches_class_names() {
    let query = Query::new("软件").with_mode(SearchMode::FullText);
    let results = search(&query, &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP);
    assert_eq!(ids(&results), vec!["542212340001", "542201112345"]);

    // Automatic classification treats the same text as a name.
    assert!(search(&Query::new("软件"), &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP).is_empty());
}

#[test]
fn test_forced_name_mode_on_digits() {
    let query = Query::new("5421").with_mode(SearchMode::Name);
    assert_eq!(query.strategy(), Some(Strategy::Name));
    assert!(search(&query, &sample_store(), &sample_initials(), DEFAULT_RESULT_CAP).is_empty());
}

#[test]
fn test_superseded_ticket_is_discarded() {
    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 16);
    let snapshot = RosterSnapshot::new(sample_store(), sample_initials());

    let stale = resolver.issue(Query::new("张"));
    let latest = resolver.issue(Query::new("李四"));

    assert!(resolver.resolve(&stale, &snapshot).is_none());
    let outcome = resolver.resolve(&latest, &snapshot).unwrap();
    assert_eq!(ids(&outcome.results), vec!["542112345679"]);
}

#[test]
fn test_repeated_query_hits_cache() {
    let resolver = QueryResolver::new(DEFAULT_RESULT_CAP, 16);
    let snapshot = RosterSnapshot::new(sample_store(), sample_initials());

    let first = resolver.search(&Query::new("wang"), &snapshot);
    let second = resolver.search(&Query::new("  wang "), &snapshot);

    assert_eq!(first.results, second.results);
    let stats = resolver.cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}
