//! Result aggregation across partitions.

use std::collections::HashSet;

use super::models::StudentRecord;

/// Maximum number of results a search returns.
pub const DEFAULT_RESULT_CAP: usize = 30;

/// Keep the first occurrence of each student ID, then truncate to `cap`.
///
/// Input order is preserved, so concatenating partition results in search
/// order and aggregating once is stable and idempotent.
pub fn aggregate<'a, I>(matches: I, cap: usize) -> Vec<&'a StudentRecord>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    matches
        .into_iter()
        .filter(|record| seen.insert(record.student_id.as_str()))
        .take(cap)
        .collect()
}
