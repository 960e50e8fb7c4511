//! Character to pinyin-initials table.
//!
//! The published table maps each Chinese character to a lowercase romanized
//! string. Lookups for characters the table does not know contribute nothing.

use std::collections::HashMap;

use serde::Deserialize;

use super::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitialsTable {
    entries: HashMap<char, String>,
}

impl InitialsTable {
    /// An empty table. Every initials lookup against it misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the published flat JSON object (`{"张": "zhang", ...}`).
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: HashMap<String, RawInitials> = serde_json::from_slice(bytes)?;
        Ok(Self::from_pairs(
            raw.into_iter().map(|(k, v)| (k, v.into_string())),
        ))
    }

    /// Build from key/value pairs. Keys that are not exactly one char are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    entries.insert(c, value.as_ref().to_lowercase());
                }
                _ => tracing::debug!(key, "Ignoring initials entry with multi-char key"),
            }
        }
        Self { entries }
    }

    pub fn get(&self, c: char) -> Option<&str> {
        self.entries.get(&c).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenated initials for every character of `name`, lowercased.
    pub fn initials_of(&self, name: &str) -> String {
        let mut initials = String::with_capacity(name.len());
        for c in name.chars() {
            if let Some(value) = self.entries.get(&c) {
                initials.push_str(value);
            }
        }
        initials
    }
}

/// Values are expected to be strings; `null` is tolerated as empty.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInitials {
    Text(String),
    Null(()),
}

impl RawInitials {
    fn into_string(self) -> String {
        match self {
            RawInitials::Text(s) => s,
            RawInitials::Null(()) => String::new(),
        }
    }
}
