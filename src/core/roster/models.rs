//! Roster data model.
//!
//! Records are deserialized from the DataTables-style envelope published for
//! each enrollment year. Field names on the wire are the registrar's column
//! codes (`XH`, `DM`, `BJMC`, `XB`, `XM`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::RosterError;

/// Sex value the registrar uses for male students. Anything else renders as female.
pub const SEX_MALE: &str = "男性";

// ============================================================================
// PartitionKey
// ============================================================================

/// Enrollment year a roster dataset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PartitionRepr", into = "String")]
pub enum PartitionKey {
    Y2021,
    Y2022,
    Y2023,
    Y2024,
}

impl PartitionKey {
    /// Every supported partition, in search order.
    pub const ALL: [PartitionKey; 4] = [
        PartitionKey::Y2021,
        PartitionKey::Y2022,
        PartitionKey::Y2023,
        PartitionKey::Y2024,
    ];

    pub fn year(self) -> u16 {
        match self {
            PartitionKey::Y2021 => 2021,
            PartitionKey::Y2022 => 2022,
            PartitionKey::Y2023 => 2023,
            PartitionKey::Y2024 => 2024,
        }
    }

    pub fn from_year(year: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.year() == year)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}

impl FromStr for PartitionKey {
    type Err = RosterError;

    /// Accepts "2021", "21" and "2021级".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix('级').unwrap_or(trimmed);
        let year = match digits.len() {
            2 => digits.parse::<u16>().ok().map(|y| 2000 + y),
            4 => digits.parse::<u16>().ok(),
            _ => None,
        };
        year.and_then(Self::from_year)
            .ok_or_else(|| RosterError::InvalidPartition(s.to_string()))
    }
}

impl From<PartitionKey> for String {
    fn from(key: PartitionKey) -> Self {
        key.to_string()
    }
}

/// Config files may spell a partition as `2021` or `"2021"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PartitionRepr {
    Number(u16),
    Text(String),
}

impl TryFrom<PartitionRepr> for PartitionKey {
    type Error = RosterError;

    fn try_from(repr: PartitionRepr) -> Result<Self, Self::Error> {
        match repr {
            PartitionRepr::Number(n) => n.to_string().parse(),
            PartitionRepr::Text(s) => s.parse(),
        }
    }
}

// ============================================================================
// PartitionRestriction
// ============================================================================

/// Which partitions a query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PartitionRestriction {
    #[default]
    All,
    Only(PartitionKey),
}

impl PartitionRestriction {
    pub fn selects(&self, key: PartitionKey) -> bool {
        match self {
            PartitionRestriction::All => true,
            PartitionRestriction::Only(only) => *only == key,
        }
    }
}

impl FromStr for PartitionRestriction {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PartitionRestriction::All)
        } else {
            s.parse().map(PartitionRestriction::Only)
        }
    }
}

impl fmt::Display for PartitionRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionRestriction::All => f.write_str("all"),
            PartitionRestriction::Only(key) => write!(f, "{key}"),
        }
    }
}

// ============================================================================
// StudentRecord
// ============================================================================

/// One student row. Immutable once loaded; the student ID is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "XH", default, deserialize_with = "lenient_string")]
    pub student_id: String,
    #[serde(rename = "DM", default, deserialize_with = "lenient_string")]
    pub class_code: String,
    #[serde(rename = "BJMC", default, deserialize_with = "lenient_string")]
    pub class_name: String,
    #[serde(rename = "XB", default, deserialize_with = "lenient_string")]
    pub sex: String,
    #[serde(rename = "XM", default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl StudentRecord {
    pub fn new(
        student_id: impl Into<String>,
        class_code: impl Into<String>,
        class_name: impl Into<String>,
        sex: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            class_code: class_code.into(),
            class_name: class_name.into(),
            sex: sex.into(),
            name: name.into(),
        }
    }

    pub fn is_male(&self) -> bool {
        self.sex == SEX_MALE
    }

    /// Single-character sex label for display.
    pub fn sex_label(&self) -> &'static str {
        if self.is_male() {
            "男"
        } else {
            "女"
        }
    }
}

/// Missing, null, numeric or boolean cells all become strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    })
}

// ============================================================================
// RosterDocument
// ============================================================================

/// Per-year dataset as published: a DataTables server-side envelope.
///
/// Only `aaData` matters for lookup. The remaining envelope fields are kept
/// for diagnostics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterDocument {
    #[serde(rename = "iTotalRecords", default)]
    pub total_records: Option<u64>,
    #[serde(rename = "aaData", default)]
    pub rows: Option<Vec<Value>>,
}

impl RosterDocument {
    /// Convert rows into records, skipping rows that are not objects or arrays.
    ///
    /// Returns the records and the number of rows skipped.
    pub fn into_records(self) -> (Vec<StudentRecord>, usize) {
        let rows = self.rows.unwrap_or_default();
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0;
        for row in rows {
            match serde_json::from_value::<StudentRecord>(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed roster row");
                    skipped += 1;
                }
            }
        }
        (records, skipped)
    }
}
