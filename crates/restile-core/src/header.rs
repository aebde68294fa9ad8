//! Request header rows.

use serde::{Deserialize, Serialize};

/// One row of the repeatable headers table.
///
/// Names are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl HeaderRow {
    /// Creates a new header row.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns whether this row names the given header, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
