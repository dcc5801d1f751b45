//! Benchmark index level series.

use serde::{Deserialize, Serialize};

use super::Date;
use crate::error::{CoreError, CoreResult};

/// Date-indexed benchmark levels (e.g. NIFTY 50 closes).
///
/// Points are held in strictly increasing date order. Lookups are as-of:
/// a date between two points resolves to the earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    name: String,
    points: Vec<(Date, f64)>,
}

impl BenchmarkSeries {
    /// Builds a series from unordered points.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate dates or non-finite / non-positive levels.
    pub fn new(name: impl Into<String>, mut points: Vec<(Date, f64)>) -> CoreResult<Self> {
        if let Some((date, level)) = points.iter().find(|(_, l)| !l.is_finite() || *l <= 0.0) {
            return Err(CoreError::invalid_value(
                "benchmark_level",
                format!("level {level} on {date} must be positive and finite"),
            ));
        }
        points.sort_by_key(|(d, _)| *d);
        if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(CoreError::DuplicateBenchmarkPoint {
                date: pair[1].0.to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    /// Benchmark name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points in date order.
    #[must_use]
    pub fn points(&self) -> &[(Date, f64)] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Level on or most recently before `date`.
    #[must_use]
    pub fn level_as_of(&self, date: Date) -> Option<f64> {
        match self.points.binary_search_by_key(&date, |(d, _)| *d) {
            Ok(pos) => Some(self.points[pos].1),
            Err(0) => None,
            Err(pos) => Some(self.points[pos - 1].1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_as_of_lookup() {
        let series = BenchmarkSeries::new(
            "NIFTY50",
            vec![(date(2024, 2, 29), 110.0), (date(2024, 1, 31), 100.0)],
        )
        .unwrap();
        assert_eq!(series.level_as_of(date(2024, 1, 15)), None);
        assert_eq!(series.level_as_of(date(2024, 1, 31)), Some(100.0));
        assert_eq!(series.level_as_of(date(2024, 2, 15)), Some(100.0));
        assert_eq!(series.level_as_of(date(2024, 12, 31)), Some(110.0));
    }

    #[test]
    fn test_rejects_bad_points() {
        let d = date(2024, 1, 31);
        assert!(BenchmarkSeries::new("X", vec![(d, 1.0), (d, 2.0)]).is_err());
        assert!(BenchmarkSeries::new("X", vec![(d, f64::NAN)]).is_err());
        assert!(BenchmarkSeries::new("X", vec![(d, 0.0)]).is_err());
    }
}
