//! Per-row widget selection for output tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::Widget;

/// How an output row renders its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Single-line read-only text.
    Plain,
    /// Multi-line read-only text.
    MultilineText,
}

impl RowKind {
    pub fn widget(self) -> Widget {
        match self {
            Self::Plain => Widget::Text,
            Self::MultilineText => Widget::Textarea,
        }
    }
}

/// Chooses the row kind from the output parameter's name.
pub fn row_kind(name: &str) -> RowKind {
    match name {
        "responseHeaders" | "responseBody" => RowKind::MultilineText,
        _ => RowKind::Plain,
    }
}

/// One row of a recorded task's output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub name: String,
    #[serde(rename = "type", default)]
    pub value_type: String,
    #[serde(default)]
    pub value: Value,
}

impl OutputRow {
    pub fn kind(&self) -> RowKind {
        row_kind(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_rows_are_multiline() {
        assert_eq!(row_kind("responseBody"), RowKind::MultilineText);
        assert_eq!(row_kind("responseHeaders"), RowKind::MultilineText);
        assert_eq!(row_kind("responseBody").widget(), Widget::Textarea);
    }

    #[test]
    fn other_rows_are_plain() {
        assert_eq!(row_kind("statusCode"), RowKind::Plain);
        assert_eq!(row_kind("responseStatus"), RowKind::Plain);
        assert_eq!(row_kind("ResponseBody"), RowKind::Plain);
        assert_eq!(row_kind("statusCode").widget(), Widget::Text);
    }

    #[test]
    fn rows_deserialise_from_recorded_outputs() {
        let row: OutputRow = serde_json::from_value(serde_json::json!({
            "name": "responseBody",
            "type": "STRING",
            "value": "<response>Success</response>",
        }))
        .unwrap();
        assert_eq!(row.kind(), RowKind::MultilineText);
        assert_eq!(row.value_type, "STRING");
    }
}
