//! Conjunctions of predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FilterError, FilterResult};
use crate::facts::ClientFacts;

use super::predicate::Predicate;

/// An immutable AND of predicates.
///
/// Predicates are canonicalized, sorted and deduplicated on construction, so
/// two specs selecting with the same predicates compare and hash equal
/// regardless of the order they were given in. The empty spec matches every
/// client.
///
/// # Example
///
/// ```rust
/// use rust_decimal_macros::dec;
/// use pmshub_portfolio::prelude::*;
///
/// let a = FilterSpec::new([
///     Predicate::equals(FilterField::Rm, "Priya Nair"),
///     Predicate::between(FilterField::Aum, Some(dec!(1000000)), None),
/// ])
/// .unwrap();
/// let b = FilterSpec::new([
///     Predicate::between(FilterField::Aum, Some(dec!(1000000)), None),
///     Predicate::equals(FilterField::Rm, " priya nair "),
/// ])
/// .unwrap();
///
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Predicate>", into = "Vec<Predicate>")]
pub struct FilterSpec {
    predicates: Vec<Predicate>,
}

impl FilterSpec {
    /// Builds a spec from predicates.
    ///
    /// # Errors
    ///
    /// `FilterError::TypeMismatch` or `FilterError::InvalidRange` from the
    /// first invalid predicate.
    pub fn new(predicates: impl IntoIterator<Item = Predicate>) -> FilterResult<Self> {
        let mut predicates = predicates
            .into_iter()
            .map(Predicate::canonical)
            .collect::<FilterResult<Vec<_>>>()?;
        predicates.sort();
        predicates.dedup();
        Ok(Self { predicates })
    }

    /// The spec that matches everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// This spec with one more predicate.
    pub fn and(self, predicate: Predicate) -> FilterResult<Self> {
        Self::new(self.predicates.into_iter().chain(std::iter::once(predicate)))
    }

    /// Canonical predicates.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// True for the match-everything spec.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True if the client satisfies every predicate.
    #[must_use]
    pub fn matches(&self, facts: &ClientFacts<'_>) -> bool {
        self.predicates.iter().all(|p| p.matches(facts))
    }
}

impl TryFrom<Vec<Predicate>> for FilterSpec {
    type Error = FilterError;

    fn try_from(predicates: Vec<Predicate>) -> Result<Self, Self::Error> {
        Self::new(predicates)
    }
}

impl From<FilterSpec> for Vec<Predicate> {
    fn from(spec: FilterSpec) -> Self {
        spec.predicates
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("all clients");
        }
        let parts: Vec<String> = self.predicates.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterField;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dedup() {
        let spec = FilterSpec::new([
            Predicate::equals(FilterField::City, "Pune"),
            Predicate::equals(FilterField::City, "PUNE "),
        ])
        .unwrap();
        assert_eq!(spec.len(), 1);
    }

    #[test]
    fn test_and_keeps_canonical_order() {
        let a = FilterSpec::all()
            .and(Predicate::at_least(FilterField::Aum, dec!(100)))
            .unwrap()
            .and(Predicate::equals(FilterField::Category, "Equity"))
            .unwrap();
        let b = FilterSpec::new([
            Predicate::equals(FilterField::Category, "equity"),
            Predicate::at_least(FilterField::Aum, dec!(100)),
        ])
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "category = \"equity\" AND aum >= 100");
    }

    #[test]
    fn test_serde_validates() {
        let spec = FilterSpec::new([Predicate::equals(FilterField::Rm, "RM01")]).unwrap();
        let json = serde_json::to_string(&spec).unwrap();
        let back: FilterSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);

        let bad = r#"[{"field": "aum", "op": {"op": "eq", "value": {"text": "lots"}}}]"#;
        assert!(serde_json::from_str::<FilterSpec>(bad).is_err());
    }
}
