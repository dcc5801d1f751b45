//! Year bases: how the time between two dates becomes a number of years.
//!
//! Used by CAGR (holding period) and anywhere else a calendar span must be
//! annualized.
//!
//! - [`YearBasis::Anniversary`]: whole anniversaries plus the remainder over 365.25
//! - [`YearBasis::Act36525`]: actual days / 365.25
//! - [`YearBasis::Act365Fixed`]: actual days / 365
//!
//! ```rust
//! use pmshub_core::{Date, YearBasis};
//!
//! let start = Date::from_ymd(2020, 1, 1).unwrap();
//! let end = Date::from_ymd(2021, 1, 1).unwrap();
//!
//! assert_eq!(YearBasis::Anniversary.year_fraction(start, end), 1.0);
//! assert!((YearBasis::Act36525.year_fraction(start, end) - 366.0 / 365.25).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Date;

/// Average days per year including leap years.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Convention for turning a date span into years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum YearBasis {
    /// Whole calendar anniversaries count as exactly one year each; the
    /// remaining stub is actual days / 365.25.
    #[default]
    #[serde(rename = "anniversary")]
    Anniversary,
    /// Actual days / 365.25.
    #[serde(rename = "act/365.25")]
    Act36525,
    /// Actual days / 365.
    #[serde(rename = "act/365f")]
    Act365Fixed,
}

impl YearBasis {
    /// Short name of the basis.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            YearBasis::Anniversary => "anniversary",
            YearBasis::Act36525 => "act/365.25",
            YearBasis::Act365Fixed => "act/365f",
        }
    }

    /// Years from `start` to `end`; negative if `end` precedes `start`.
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        if end < start {
            return -self.year_fraction(end, start);
        }
        let days = start.days_between(&end) as f64;
        match self {
            YearBasis::Act36525 => days / DAYS_PER_YEAR,
            YearBasis::Act365Fixed => days / 365.0,
            YearBasis::Anniversary => anniversary_fraction(start, end),
        }
    }
}

fn anniversary_fraction(start: Date, end: Date) -> f64 {
    let mut whole = end.year() - start.year();
    let mut anchor = match start.add_years(whole) {
        Ok(d) => d,
        Err(_) => return start.days_between(&end) as f64 / DAYS_PER_YEAR,
    };
    if anchor > end {
        whole -= 1;
        anchor = match start.add_years(whole) {
            Ok(d) => d,
            Err(_) => return start.days_between(&end) as f64 / DAYS_PER_YEAR,
        };
    }
    f64::from(whole) + anchor.days_between(&end) as f64 / DAYS_PER_YEAR
}

impl fmt::Display for YearBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for YearBasis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anniversary" => Ok(YearBasis::Anniversary),
            "act/365.25" | "actual/365.25" => Ok(YearBasis::Act36525),
            "act/365f" | "act/365" | "actual/365" => Ok(YearBasis::Act365Fixed),
            other => Err(CoreError::invalid_value(
                "year_basis",
                format!("unknown year basis '{other}'"),
            )),
        }
    }
}
