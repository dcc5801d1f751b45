//! Single-field predicates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use pmshub_core::RiskProfile;

use crate::error::{FilterError, FilterResult};
use crate::facts::{normalize_text, ClientFacts};

use super::field::FilterField;
use super::value::FilterValue;

/// Comparison applied to a field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FilterOp {
    /// Field equals the value.
    Eq(FilterValue),
    /// Field equals any of the values. An empty set matches nothing.
    OneOf(BTreeSet<FilterValue>),
    /// Field lies within the bounds, both inclusive; a missing bound is open.
    Between {
        /// Lower bound.
        low: Option<FilterValue>,
        /// Upper bound.
        high: Option<FilterValue>,
    },
}

/// `field op value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Predicate {
    /// Attribute tested.
    pub field: FilterField,
    /// Comparison.
    pub op: FilterOp,
}

impl Predicate {
    /// `field == value`.
    #[must_use]
    pub fn equals(field: FilterField, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            op: FilterOp::Eq(value.into()),
        }
    }

    /// `field in values`.
    #[must_use]
    pub fn one_of<V: Into<FilterValue>>(field: FilterField, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field,
            op: FilterOp::OneOf(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `low <= field <= high`, either bound optional.
    #[must_use]
    pub fn between<V: Into<FilterValue>>(field: FilterField, low: Option<V>, high: Option<V>) -> Self {
        Self {
            field,
            op: FilterOp::Between {
                low: low.map(Into::into),
                high: high.map(Into::into),
            },
        }
    }

    /// `field >= low`.
    #[must_use]
    pub fn at_least(field: FilterField, low: impl Into<FilterValue>) -> Self {
        Self::between(field, Some(low.into()), None)
    }

    /// `field <= high`.
    #[must_use]
    pub fn at_most(field: FilterField, high: impl Into<FilterValue>) -> Self {
        Self::between(field, None, Some(high.into()))
    }

    /// Validates value types and rewrites the predicate into canonical form.
    ///
    /// Text is trimmed and lowercased, risk profiles are resolved to their
    /// canonical names and a one-element `OneOf` becomes `Eq`.
    pub fn canonical(self) -> FilterResult<Self> {
        let field = self.field;
        let op = match self.op {
            FilterOp::Eq(v) => FilterOp::Eq(canonical_value(field, v)?),
            FilterOp::OneOf(values) => {
                let mut values = values
                    .into_iter()
                    .map(|v| canonical_value(field, v))
                    .collect::<FilterResult<BTreeSet<_>>>()?;
                if values.len() == 1 {
                    match values.pop_first() {
                        Some(v) => FilterOp::Eq(v),
                        None => FilterOp::OneOf(values),
                    }
                } else {
                    FilterOp::OneOf(values)
                }
            }
            FilterOp::Between { low, high } => {
                let low = low.map(|v| canonical_value(field, v)).transpose()?;
                let high = high.map(|v| canonical_value(field, v)).transpose()?;
                if let (Some(l), Some(h)) = (&low, &high) {
                    if l > h {
                        return Err(FilterError::invalid_range(
                            field.name(),
                            format!("lower bound {l} above upper bound {h}"),
                        ));
                    }
                }
                FilterOp::Between { low, high }
            }
        };
        Ok(Self { field, op })
    }

    /// True if the client satisfies the predicate.
    ///
    /// A client with no value for the field never matches.
    #[must_use]
    pub fn matches(&self, facts: &ClientFacts<'_>) -> bool {
        self.field.values(facts).iter().any(|v| self.op.accepts(v))
    }
}

impl FilterOp {
    fn accepts(&self, value: &FilterValue) -> bool {
        match self {
            FilterOp::Eq(target) => value == target,
            FilterOp::OneOf(set) => set.contains(value),
            FilterOp::Between { low, high } => {
                low.as_ref().map_or(true, |l| value >= l) && high.as_ref().map_or(true, |h| value <= h)
            }
        }
    }
}

fn canonical_value(field: FilterField, value: FilterValue) -> FilterResult<FilterValue> {
    if value.kind() != field.kind() {
        return Err(FilterError::type_mismatch(
            field.name(),
            field.kind().to_string(),
            value.to_string(),
        ));
    }
    match (field, value) {
        (FilterField::RiskProfile, FilterValue::Text(s)) => RiskProfile::from_str(&s)
            .map(|p| FilterValue::Text(normalize_text(p.as_str())))
            .map_err(|_| FilterError::type_mismatch(field.name(), "risk profile", format!("\"{s}\""))),
        (_, FilterValue::Text(s)) => Ok(FilterValue::Text(normalize_text(&s))),
        (_, other) => Ok(other),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.op {
            FilterOp::Eq(v) => write!(f, "{} = {v}", self.field),
            FilterOp::OneOf(values) => {
                let list: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} in [{}]", self.field, list.join(", "))
            }
            FilterOp::Between { low, high } => match (low, high) {
                (Some(l), Some(h)) => write!(f, "{l} <= {} <= {h}", self.field),
                (Some(l), None) => write!(f, "{} >= {l}", self.field),
                (None, Some(h)) => write!(f, "{} <= {h}", self.field),
                (None, None) => write!(f, "{} is set", self.field),
            },
        }
    }
}
