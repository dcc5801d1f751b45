//! Untyped source rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One untyped cell as it arrived from a CSV or JSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Free text.
    Text(String),
}

impl RawValue {
    /// True for `Null` and for blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text cell from a CSV field; empty fields become `Null`.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        if field.trim().is_empty() {
            RawValue::Null
        } else {
            RawValue::Text(field.to_string())
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, ""),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(i) => write!(f, "{i}"),
            RawValue::Float(x) => write!(f, "{x}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        RawValue::Int(i)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        RawValue::Float(x)
    }
}

/// A source row: column name to untyped value, plus an identifier used in
/// audit records and rejection reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Row identifier (e.g. `"upload.csv:7"`).
    pub row_id: String,
    /// Cells keyed by source column header.
    pub cells: BTreeMap<String, RawValue>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new(row_id: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Adds a cell.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.cells.insert(column.into(), value.into());
        self
    }

    /// Sets a cell.
    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) {
        self.cells.insert(column.into(), value);
    }
}
