//! Top-level application configuration.
//!
//! Resolution order is built-in defaults, then an optional TOML file, then
//! any dotted-path overrides (see [`crate::overrides`]). Every section has
//! defaults, so a file only needs the keys it changes:
//!
//! ```toml
//! [metrics]
//! risk_free_rate = 0.065
//!
//! [loader]
//! date_format = "%d/%m/%Y"
//! merge_mode = "overwrite"
//!
//! [view]
//! aum_bands = [2500000, 10000000]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use pmshub_metrics::config::MetricsConfig;

use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};
use crate::settings::{LoaderSettings, ViewSettings};

/// Every setting the reporting core reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Metrics engine settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Data loading defaults.
    #[serde(default)]
    pub loader: LoaderSettings,

    /// Filter view settings.
    #[serde(default)]
    pub view: ViewSettings,
}

impl AppConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// `ConfigError::Parse` on malformed TOML or mistyped values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, overlaid with `path` when given, then validated.
    ///
    /// # Errors
    ///
    /// Any read or parse error, or the validation errors of the result.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate_or_error()?;
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// `ConfigError::Serialization` if a value has no TOML form.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        errors.extend(self.metrics.validate().into_iter().map(|e| e.in_section("metrics")));
        errors.extend(self.loader.validate().into_iter().map(|e| e.in_section("loader")));
        errors.extend(self.view.validate().into_iter().map(|e| e.in_section("view")));
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmshub_core::MergeMode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = AppConfig::from_toml_str(
            r#"
            [metrics]
            risk_free_rate = 0.065

            [loader]
            merge_mode = "overwrite"
            "#,
        )
        .unwrap();
        assert!((config.metrics.risk_free_rate - 0.065).abs() < 1e-12);
        assert_eq!(config.metrics.periods_per_year, 12);
        assert_eq!(config.loader.merge_mode, MergeMode::Overwrite);
        assert_eq!(config.loader.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_custom_bands() {
        let config = AppConfig::from_toml_str("[view]\naum_bands = [2500000, 10000000]\n").unwrap();
        assert_eq!(config.view.aum_bands.edges(), &[dec!(2500000), dec!(10000000)]);
    }

    #[test]
    fn test_bad_bands_fail_to_parse() {
        let err = AppConfig::from_toml_str("[view]\naum_bands = [5, 1]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_is_sectioned() {
        let mut config = AppConfig::default();
        config.metrics.periods_per_year = 0;
        config.loader.reconciliation_tolerance = dec!(-0.5);
        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["metrics.periods_per_year", "loader.reconciliation_tolerance"]
        );
        assert!(matches!(
            config.validate_or_error(),
            Err(ConfigError::MultipleValidationErrors(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = AppConfig::default();
        config.loader.date_format = "%d-%m-%Y".into();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
