//! AUM size bands.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

const LAKH: Decimal = dec!(100000);
const CRORE: Decimal = dec!(10000000);

/// Ascending AUM edges splitting clients into size bands.
///
/// `n` edges make `n + 1` bands: below the first edge, between each pair
/// (lower edge inclusive) and at or above the last edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Decimal>", into = "Vec<Decimal>")]
pub struct AumBands {
    edges: Vec<Decimal>,
}

impl AumBands {
    /// Creates bands from strictly increasing, positive edges.
    pub fn new(edges: Vec<Decimal>) -> FilterResult<Self> {
        if edges.is_empty() {
            return Err(FilterError::InvalidBands("at least one edge is required".into()));
        }
        if let Some(edge) = edges.iter().find(|e| e.is_sign_negative() || e.is_zero()) {
            return Err(FilterError::InvalidBands(format!("edge {edge} is not positive")));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(FilterError::InvalidBands("edges must be strictly increasing".into()));
        }
        Ok(Self { edges })
    }

    /// Band edges.
    #[must_use]
    pub fn edges(&self) -> &[Decimal] {
        &self.edges
    }

    /// Index of the band holding `aum`.
    #[must_use]
    pub fn index_of(&self, aum: Decimal) -> usize {
        self.edges.partition_point(|edge| *edge <= aum)
    }

    /// Label of the band holding `aum`.
    #[must_use]
    pub fn label_for(&self, aum: Decimal) -> String {
        self.label(self.index_of(aum))
    }

    /// All labels, smallest band first.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        (0..=self.edges.len()).map(|i| self.label(i)).collect()
    }

    fn label(&self, index: usize) -> String {
        let last = self.edges.len();
        match index {
            0 => format!("< {}", compact_inr(self.edges[0])),
            i if i >= last => format!(">= {}", compact_inr(self.edges[last - 1])),
            i => format!("{} - {}", compact_inr(self.edges[i - 1]), compact_inr(self.edges[i])),
        }
    }
}

impl Default for AumBands {
    /// 10 L, 50 L, 1 Cr and 5 Cr.
    fn default() -> Self {
        Self {
            edges: vec![dec!(1000000), dec!(5000000), dec!(10000000), dec!(50000000)],
        }
    }
}

impl TryFrom<Vec<Decimal>> for AumBands {
    type Error = FilterError;

    fn try_from(edges: Vec<Decimal>) -> Result<Self, Self::Error> {
        Self::new(edges)
    }
}

impl From<AumBands> for Vec<Decimal> {
    fn from(bands: AumBands) -> Self {
        bands.edges
    }
}

/// Formats an amount in lakh or crore, e.g. `50 L` or `2.5 Cr`.
#[must_use]
pub fn compact_inr(amount: Decimal) -> String {
    if amount.abs() >= CRORE {
        format!("{} Cr", (amount / CRORE).normalize())
    } else if amount.abs() >= LAKH {
        format!("{} L", (amount / LAKH).normalize())
    } else {
        amount.normalize().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let bands = AumBands::default();
        assert_eq!(
            bands.labels(),
            vec!["< 10 L", "10 L - 50 L", "50 L - 1 Cr", "1 Cr - 5 Cr", ">= 5 Cr"]
        );
    }

    #[test]
    fn test_lower_edge_inclusive() {
        let bands = AumBands::default();
        assert_eq!(bands.label_for(dec!(999999.99)), "< 10 L");
        assert_eq!(bands.label_for(dec!(1000000)), "10 L - 50 L");
        assert_eq!(bands.label_for(dec!(50000000)), ">= 5 Cr");
        assert_eq!(bands.label_for(dec!(-10)), "< 10 L");
    }

    #[test]
    fn test_invalid_edges() {
        assert!(AumBands::new(vec![]).is_err());
        assert!(AumBands::new(vec![dec!(5), dec!(5)]).is_err());
        assert!(AumBands::new(vec![dec!(0), dec!(5)]).is_err());
        assert!(serde_json::from_str::<AumBands>("[3, 1]").is_err());
    }

    #[test]
    fn test_compact_inr() {
        assert_eq!(compact_inr(dec!(25000000)), "2.5 Cr");
        assert_eq!(compact_inr(dec!(750000)), "7.5 L");
        assert_eq!(compact_inr(dec!(950)), "950");
    }
}
