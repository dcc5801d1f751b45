//! Coercion of untyped cells into semantic types.

use rust_decimal::Decimal;
use std::str::FromStr;

use pmshub_core::{Date, RiskProfile};

use crate::error::{LoadError, LoadResult};
use crate::fields::Field;
use crate::raw::RawValue;

const CURRENCY_MARKERS: [&str; 5] = ["₹", "$", "Rs.", "Rs", "INR"];

/// Coerces cells for one row, tagging errors with the row id.
pub struct Coercer<'a> {
    row: &'a str,
    date_format: Option<&'a str>,
}

impl<'a> Coercer<'a> {
    /// Creates a coercer for `row`.
    #[must_use]
    pub fn new(row: &'a str, date_format: Option<&'a str>) -> Self {
        Self { row, date_format }
    }

    /// Row id errors are tagged with.
    #[must_use]
    pub fn row(&self) -> &str {
        self.row
    }

    fn fail(&self, field: Field, value: &RawValue, expected: &str) -> LoadError {
        LoadError::coercion(self.row, field.name(), value.to_string(), expected)
    }

    /// Trimmed text. Numbers are rendered as text.
    #[must_use]
    pub fn text(&self, value: &RawValue) -> Option<String> {
        match value {
            RawValue::Null => None,
            RawValue::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            RawValue::Int(i) => Some(i.to_string()),
            RawValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => Some(format!("{x:.0}")),
            other => Some(other.to_string()),
        }
    }

    /// Monetary amount. Accepts currency markers, thousands separators and
    /// parenthesized negatives.
    pub fn decimal(&self, field: Field, value: &RawValue) -> LoadResult<Decimal> {
        match value {
            RawValue::Int(i) => Ok(Decimal::from(*i)),
            RawValue::Float(x) => {
                Decimal::try_from(*x).map_err(|_| self.fail(field, value, "decimal amount"))
            }
            RawValue::Text(s) => {
                parse_amount(s).ok_or_else(|| self.fail(field, value, "decimal amount"))
            }
            RawValue::Null | RawValue::Bool(_) => Err(self.fail(field, value, "decimal amount")),
        }
    }

    /// Date using the configured format first, then ISO 8601.
    pub fn date(&self, field: Field, value: &RawValue) -> LoadResult<Date> {
        let RawValue::Text(s) = value else {
            return Err(self.fail(field, value, "date"));
        };
        let s = s.trim();
        if let Some(format) = self.date_format {
            if let Ok(date) = Date::parse_with_format(s, format) {
                return Ok(date);
            }
        }
        if let Ok(date) = Date::parse(s) {
            return Ok(date);
        }
        // Timestamps such as "2024-03-31T00:00:00" or "2024-03-31 00:00:00".
        s.get(..10)
            .filter(|_| s.len() > 10 && matches!(s.as_bytes()[10], b'T' | b' '))
            .and_then(|head| Date::parse(head).ok())
            .ok_or_else(|| self.fail(field, value, "date"))
    }

    /// Non-negative integer. Integral floats are accepted.
    pub fn integer(&self, field: Field, value: &RawValue) -> LoadResult<u32> {
        let parsed = match value {
            RawValue::Int(i) => u32::try_from(*i).ok(),
            RawValue::Float(x) => integral(*x),
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<u32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            RawValue::Null | RawValue::Bool(_) => None,
        };
        parsed.ok_or_else(|| self.fail(field, value, "non-negative integer"))
    }

    /// Risk profile by name.
    pub fn risk_profile(&self, field: Field, value: &RawValue) -> LoadResult<RiskProfile> {
        self.text(value)
            .and_then(|s| RiskProfile::from_str(&s).ok())
            .ok_or_else(|| self.fail(field, value, "risk profile"))
    }
}

fn integral(x: f64) -> Option<u32> {
    if x.is_finite() && x.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&x) {
        Some(x as u32)
    } else {
        None
    }
}

/// Parses an amount such as `"₹1,25,000.50"`, `"(2,500)"` or `"-3e3"`.
#[must_use]
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let mut s = input.trim();
    let mut negative = false;
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner.trim();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.trim_start();
    }
    for marker in CURRENCY_MARKERS {
        if let Some(rest) = s.strip_prefix(marker) {
            s = rest.trim_start();
            break;
        }
    }
    let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() || cleaned.starts_with('-') {
        return None;
    }
    let magnitude = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,25,000.50"), Some(dec!(125000.50)));
        assert_eq!(parse_amount("₹ 2,000"), Some(dec!(2000)));
        assert_eq!(parse_amount("Rs. 750"), Some(dec!(750)));
        assert_eq!(parse_amount("$10"), Some(dec!(10)));
        assert_eq!(parse_amount("(2,500)"), Some(dec!(-2500)));
        assert_eq!(parse_amount("-₹300"), Some(dec!(-300)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount("twelve"), None);
        assert_eq!(parse_amount("--5"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_decimal_cells() {
        let c = Coercer::new("r1", None);
        assert_eq!(c.decimal(Field::Aum, &RawValue::Int(5)).unwrap(), dec!(5));
        assert_eq!(c.decimal(Field::Aum, &RawValue::Float(2.5)).unwrap(), dec!(2.5));
        let err = c.decimal(Field::Aum, &RawValue::from("abc")).unwrap_err();
        assert_eq!(
            err,
            LoadError::coercion("r1", "aum", "abc", "decimal amount")
        );
    }

    #[test]
    fn test_dates() {
        let c = Coercer::new("r1", Some("%d/%m/%Y"));
        let expected = Date::from_ymd(2024, 3, 31).unwrap();
        assert_eq!(c.date(Field::AsOf, &RawValue::from("31/03/2024")).unwrap(), expected);
        assert_eq!(c.date(Field::AsOf, &RawValue::from("2024-03-31")).unwrap(), expected);
        assert_eq!(c.date(Field::AsOf, &RawValue::from("2024-03-31T00:00:00")).unwrap(), expected);
        assert!(c.date(Field::AsOf, &RawValue::from("31.03.2024")).is_err());
        assert!(c.date(Field::AsOf, &RawValue::Int(20240331)).is_err());
    }

    #[test]
    fn test_integers() {
        let c = Coercer::new("r1", None);
        assert_eq!(c.integer(Field::Age, &RawValue::Float(42.0)).unwrap(), 42);
        assert_eq!(c.integer(Field::Age, &RawValue::from("42.0")).unwrap(), 42);
        assert!(c.integer(Field::Age, &RawValue::Float(42.5)).is_err());
        assert!(c.integer(Field::Age, &RawValue::Int(-1)).is_err());
    }

    #[test]
    fn test_text_renders_numbers() {
        let c = Coercer::new("r1", None);
        assert_eq!(c.text(&RawValue::Float(1001.0)), Some("1001".into()));
        assert_eq!(c.text(&RawValue::from("  ")), None);
    }
}
