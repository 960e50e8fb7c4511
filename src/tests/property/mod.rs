//! Property-based tests for roster lookup
//!
//! ## Test Modules
//!
//! - `classifier_props`: query classification
//!   - Full student IDs always classify as exact-ID
//!   - Other all-digit strings of length >= 4 classify as partial-ID
//!   - Pure CJK strings classify as name
//!   - Blank input never classifies
//!
//! - `aggregate_props`: result aggregation
//!   - Output never exceeds the cap
//!   - Output IDs are unique
//!   - Aggregating an aggregate changes nothing
//!
//! - `search_props`: end-to-end search over generated rosters
//!   - More than 30 raw matches always yield exactly 30 results
//!   - An empty initials table never matches
//!   - Results are a subsequence of the concatenated partitions
//!
//! By default, proptest runs 256 cases per property. Override with
//! `PROPTEST_CASES`.

mod classifier_props;
