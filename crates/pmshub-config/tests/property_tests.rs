//! Property-based tests for overrides and validation.

use proptest::prelude::*;

use pmshub_config::prelude::*;

proptest! {
    #[test]
    fn prop_in_range_rate_override_applies(rate in -1.0f64..=1.0) {
        let mut config = AppConfig::default();
        apply_override(&mut config, "metrics.risk_free_rate", &rate.to_string()).unwrap();
        prop_assert!((config.metrics.risk_free_rate - rate).abs() < 1e-12);
        prop_assert!(config.is_valid());
    }

    #[test]
    fn prop_out_of_range_rate_leaves_config_unchanged(rate in 1.0001f64..100.0) {
        let mut config = AppConfig::default();
        let result = apply_override(&mut config, "metrics.risk_free_rate", &rate.to_string());
        let is_validation_error = matches!(result, Err(ConfigError::Validation { .. }));
        prop_assert!(is_validation_error);
        prop_assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn prop_frequency_bounds(ppy in 0u32..1000) {
        let mut config = AppConfig::default();
        config.metrics.periods_per_year = ppy;
        prop_assert_eq!(config.is_valid(), (1..=366).contains(&ppy));
    }

    #[test]
    fn prop_toml_round_trip(capacity in 0usize..10_000, rate in -0.5f64..0.5) {
        let mut config = AppConfig::default();
        config.view.cache_capacity = capacity;
        config.metrics.risk_free_rate = rate;
        let text = config.to_toml_string().unwrap();
        prop_assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }
}
