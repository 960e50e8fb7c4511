//! Strategy matchers.
//!
//! Each matcher scans one partition and yields matching records in partition
//! order. Matching is plain substring containment; nothing is re-ranked.

use super::classifier::Strategy;
use super::initials::InitialsTable;
use super::models::StudentRecord;

/// First record whose ID equals `query`. IDs are expected unique per partition.
pub fn exact_id<'a>(records: &'a [StudentRecord], query: &str) -> Option<&'a StudentRecord> {
    records.iter().find(|r| r.student_id == query)
}

pub fn partial_id<'a>(
    records: &'a [StudentRecord],
    query: &'a str,
) -> impl Iterator<Item = &'a StudentRecord> + 'a {
    records.iter().filter(move |r| r.student_id.contains(query))
}

pub fn name<'a>(
    records: &'a [StudentRecord],
    query: &'a str,
) -> impl Iterator<Item = &'a StudentRecord> + 'a {
    records.iter().filter(move |r| r.name.contains(query))
}

/// Records whose concatenated name initials contain `query` (lowercased).
///
/// This is substring, not acronym, matching: with full-syllable table values
/// "zs" does not match 张三 ("zhangsan").
pub fn initials<'a>(
    records: &'a [StudentRecord],
    query: &str,
    table: &'a InitialsTable,
) -> impl Iterator<Item = &'a StudentRecord> + 'a {
    let needle = query.to_lowercase();
    let skip_all = table.is_empty() || needle.is_empty();
    records
        .iter()
        .filter(move |r| !skip_all && table.initials_of(&r.name).contains(&needle))
}

pub fn full_text<'a>(
    records: &'a [StudentRecord],
    query: &'a str,
) -> impl Iterator<Item = &'a StudentRecord> + 'a {
    records.iter().filter(move |r| {
        r.student_id.contains(query) || r.name.contains(query) || r.class_name.contains(query)
    })
}

/// Run `strategy` over one partition.
pub fn run_strategy<'a>(
    strategy: Strategy,
    records: &'a [StudentRecord],
    query: &'a str,
    table: &'a InitialsTable,
) -> Vec<&'a StudentRecord> {
    match strategy {
        Strategy::ExactId => exact_id(records, query).into_iter().collect(),
        Strategy::PartialId => partial_id(records, query).collect(),
        Strategy::Name => name(records, query).collect(),
        Strategy::Initials => initials(records, query, table).collect(),
        Strategy::FullText => full_text(records, query).collect(),
    }
}
