//! Typed predicate values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use pmshub_core::Date;

/// The type a filter field compares on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Case-insensitive text.
    Text,
    /// Decimal number.
    Number,
    /// Calendar date.
    Date,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => write!(f, "text"),
            ValueKind::Number => write!(f, "number"),
            ValueKind::Date => write!(f, "date"),
        }
    }
}

/// A value on the right-hand side of a predicate.
///
/// Ordering is only meaningful between values of the same kind, which
/// [`FilterSpec`](super::FilterSpec) construction guarantees.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    /// Text, compared after trimming and lowercasing.
    Text(String),
    /// Amount or count.
    Number(Decimal),
    /// Date.
    Date(Date),
}

impl FilterValue {
    /// Kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            FilterValue::Text(_) => ValueKind::Text,
            FilterValue::Number(_) => ValueKind::Number,
            FilterValue::Date(_) => ValueKind::Date,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(s) => write!(f, "\"{s}\""),
            FilterValue::Number(n) => write!(f, "{n}"),
            FilterValue::Date(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<Decimal> for FilterValue {
    fn from(n: Decimal) -> Self {
        FilterValue::Number(n)
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        FilterValue::Number(Decimal::from(n))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Number(Decimal::from(n))
    }
}

impl From<Date> for FilterValue {
    fn from(d: Date) -> Self {
        FilterValue::Date(d)
    }
}
