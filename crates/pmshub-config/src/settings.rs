//! Loader, view and metrics settings and their validation rules.

use chrono::format::{Item, StrftimeItems};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pmshub_core::{Date, MergeMode};
use pmshub_loader::{MappingConfig, SourceKind};
use pmshub_metrics::config::{MetricsConfig, XirrConfig};
use pmshub_portfolio::bucketing::AumBands;

use crate::error::{Validate, ValidationError};

// =============================================================================
// LOADER SETTINGS
// =============================================================================

/// Defaults applied to every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// `chrono` format tried before ISO 8601.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Policy for rows that collide with existing records.
    #[serde(default)]
    pub merge_mode: MergeMode,

    /// Allowed corpus reconciliation difference, in currency units.
    #[serde(default = "default_reconciliation_tolerance")]
    pub reconciliation_tolerance: Decimal,

    /// As-of date for upload rows that carry none.
    #[serde(default)]
    pub default_as_of: Option<Date>,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_reconciliation_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            merge_mode: MergeMode::default(),
            reconciliation_tolerance: default_reconciliation_tolerance(),
            default_as_of: None,
        }
    }
}

impl LoaderSettings {
    /// Mapping options for `source` carrying these defaults.
    #[must_use]
    pub fn mapping(&self, source: SourceKind) -> MappingConfig {
        let mut config = MappingConfig::new(source)
            .with_date_format(self.date_format.clone())
            .with_merge_mode(self.merge_mode)
            .with_reconciliation_tolerance(self.reconciliation_tolerance);
        if let Some(date) = self.default_as_of {
            config = config.with_default_as_of(date);
        }
        config
    }
}

impl Validate for LoaderSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.date_format.trim().is_empty() {
            errors.push(ValidationError::new("date_format", "Date format cannot be empty"));
        } else if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            errors.push(ValidationError::with_rule(
                "date_format",
                format!("'{}' is not a valid date format", self.date_format),
                "strftime",
            ));
        }

        if self.reconciliation_tolerance.is_sign_negative() {
            errors.push(ValidationError::with_rule(
                "reconciliation_tolerance",
                "Reconciliation tolerance cannot be negative",
                "non_negative",
            ));
        }

        errors
    }
}

// =============================================================================
// VIEW SETTINGS
// =============================================================================

/// Filter view and memoization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    /// Entries kept by each memo cache; 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// AUM band edges for the size distribution.
    #[serde(default)]
    pub aum_bands: AumBands,
}

fn default_cache_capacity() -> usize {
    256
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            aum_bands: AumBands::default(),
        }
    }
}

impl Validate for ViewSettings {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.cache_capacity > 1_000_000 {
            errors.push(ValidationError::with_rule(
                "cache_capacity",
                format!("Cache capacity {} exceeds maximum of 1000000", self.cache_capacity),
                "max_capacity",
            ));
        }
        errors
    }
}

// =============================================================================
// METRICS SETTINGS
// =============================================================================

impl Validate for XirrConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(self.tolerance > 0.0 && self.tolerance <= 1e-2) {
            errors.push(ValidationError::with_rule(
                "tolerance",
                "Solver tolerance must be in (0, 1e-2]",
                "valid_tolerance",
            ));
        }

        if self.max_iterations == 0 || self.max_iterations > 10_000 {
            errors.push(ValidationError::with_rule(
                "max_iterations",
                "Max iterations must be between 1 and 10000",
                "valid_iterations",
            ));
        }

        if self.lower_bound <= -1.0 {
            errors.push(ValidationError::with_rule(
                "lower_bound",
                "Lower bound must be above -1 (a -100% rate is undefined)",
                "valid_bounds",
            ));
        }

        if self.lower_bound >= self.upper_bound {
            errors.push(ValidationError::with_rule(
                "upper_bound",
                format!(
                    "Upper bound {} must exceed lower bound {}",
                    self.upper_bound, self.lower_bound
                ),
                "valid_bounds",
            ));
        }

        let in_bounds = |g: f64| g > self.lower_bound && g < self.upper_bound;
        if !in_bounds(self.initial_guess) {
            errors.push(ValidationError::with_rule(
                "initial_guess",
                format!("Initial guess {} lies outside the bounds", self.initial_guess),
                "valid_guess",
            ));
        }
        if let Some(g) = self.retry_guesses.iter().find(|g| !in_bounds(**g)) {
            errors.push(ValidationError::with_rule(
                "retry_guesses",
                format!("Retry guess {g} lies outside the bounds"),
                "valid_guess",
            ));
        }

        errors
    }
}

impl Validate for MetricsConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.risk_free_rate.is_finite() || self.risk_free_rate.abs() > 1.0 {
            errors.push(ValidationError::with_rule(
                "risk_free_rate",
                "Risk-free rate must be an annual fraction between -1 and 1",
                "valid_rate",
            ));
        }

        if self.periods_per_year == 0 || self.periods_per_year > 366 {
            errors.push(ValidationError::with_rule(
                "periods_per_year",
                "Periods per year must be between 1 and 366",
                "valid_frequency",
            ));
        }

        errors.extend(self.xirr.validate().into_iter().map(|e| e.in_section("xirr")));
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LoaderSettings::default().is_valid());
        assert!(ViewSettings::default().is_valid());
        assert!(MetricsConfig::default().is_valid());
    }

    #[test]
    fn test_loader_rules() {
        let settings = LoaderSettings {
            date_format: "%d/%Q/%Y".into(),
            reconciliation_tolerance: dec!(-1),
            ..LoaderSettings::default()
        };
        let fields: Vec<String> = settings.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["date_format", "reconciliation_tolerance"]);
    }

    #[test]
    fn test_metrics_rules() {
        let mut config = MetricsConfig::default().with_periods_per_year(0);
        config.xirr.lower_bound = 2.0;
        config.xirr.upper_bound = 1.0;
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"periods_per_year".to_string()));
        assert!(fields.contains(&"xirr.upper_bound".to_string()));
        assert!(fields.contains(&"xirr.initial_guess".to_string()));
    }

    #[test]
    fn test_mapping_carries_defaults() {
        let settings = LoaderSettings {
            date_format: "%d/%m/%Y".into(),
            merge_mode: MergeMode::Overwrite,
            default_as_of: Some(Date::from_ymd(2024, 3, 31).unwrap()),
            ..LoaderSettings::default()
        };
        let mapping = settings.mapping(SourceKind::Upload);
        assert_eq!(mapping.source, SourceKind::Upload);
        assert_eq!(mapping.date_format.as_deref(), Some("%d/%m/%Y"));
        assert_eq!(mapping.merge_mode, MergeMode::Overwrite);
        assert!(mapping.default_as_of.is_some());
    }
}
