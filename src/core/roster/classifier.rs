//! Query classification.
//!
//! Decides, from a free-text query, which matching strategy applies. In
//! automatic mode the rules are checked in priority order:
//!
//! 1. full student ID (`542[1-4]` + 8 digits) -> [`Strategy::ExactId`]
//! 2. four or more digits                     -> [`Strategy::PartialId`]
//! 3. only CJK ideographs                     -> [`Strategy::Name`]
//! 4. anything else                           -> [`Strategy::Initials`]
//!
//! [`Strategy::FullText`] is never chosen automatically; it is only reachable
//! through [`SearchMode::FullText`].

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::RosterError;

/// Full student ID: campus code 5421..5424 followed by eight digits.
static FULL_STUDENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^542[1-4][0-9]{8}$").expect("Failed to compile student ID regex"));

/// Shortest all-digit query treated as a partial student ID.
pub const MIN_PARTIAL_ID_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ExactId,
    PartialId,
    Name,
    Initials,
    FullText,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strategy::ExactId => "exact-id",
            Strategy::PartialId => "partial-id",
            Strategy::Name => "name",
            Strategy::Initials => "initials",
            Strategy::FullText => "full-text",
        };
        f.write_str(label)
    }
}

/// How a query is turned into a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Pick from the shape of the query.
    #[default]
    Auto,
    /// Student ID search: exact for a full ID, substring otherwise.
    StudentId,
    Name,
    Initials,
    FullText,
}

impl SearchMode {
    /// Strategy for `query` under this mode; `None` for a blank query.
    pub fn strategy_for(self, query: &str) -> Option<Strategy> {
        let q = query.trim();
        if q.is_empty() {
            return None;
        }
        Some(match self {
            SearchMode::Auto => return classify(q),
            SearchMode::StudentId if is_full_student_id(q) => Strategy::ExactId,
            SearchMode::StudentId => Strategy::PartialId,
            SearchMode::Name => Strategy::Name,
            SearchMode::Initials => Strategy::Initials,
            SearchMode::FullText => Strategy::FullText,
        })
    }
}

impl FromStr for SearchMode {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SearchMode::Auto),
            "id" | "xh" | "student_id" | "student-id" => Ok(SearchMode::StudentId),
            "name" | "xm" => Ok(SearchMode::Name),
            "initials" | "pinyin" => Ok(SearchMode::Initials),
            "fulltext" | "full_text" | "full-text" => Ok(SearchMode::FullText),
            _ => Err(RosterError::InvalidMode(s.to_string())),
        }
    }
}

/// Automatic classification. Returns `None` for blank input.
pub fn classify(query: &str) -> Option<Strategy> {
    let q = query.trim();
    if q.is_empty() {
        None
    } else if is_full_student_id(q) {
        Some(Strategy::ExactId)
    } else if is_partial_student_id(q) {
        Some(Strategy::PartialId)
    } else if is_chinese(q) {
        Some(Strategy::Name)
    } else {
        Some(Strategy::Initials)
    }
}

pub fn is_full_student_id(q: &str) -> bool {
    FULL_STUDENT_ID.is_match(q)
}

pub fn is_partial_student_id(q: &str) -> bool {
    q.len() >= MIN_PARTIAL_ID_LEN && q.bytes().all(|b| b.is_ascii_digit())
}

/// True when `q` is non-empty and every char is a CJK ideograph.
pub fn is_chinese(q: &str) -> bool {
    !q.is_empty() && q.chars().all(is_cjk_ideograph)
}

fn is_cjk_ideograph(c: char) -> bool {
    // Unified Ideographs and Extension A.
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}
