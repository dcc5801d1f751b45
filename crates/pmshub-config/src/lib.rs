//! # PMS Hub Configuration
//!
//! Layered settings for the reporting core:
//!
//! - **Defaults**: every section implements `Default`
//! - **TOML files**: [`AppConfig::from_file`] overlays only the keys present
//! - **Overrides**: [`apply_override`] replaces one field by dotted path
//! - **Validation**: [`Validate`] collects every problem, not just the first
//!
//! ## Example
//!
//! ```rust
//! use pmshub_config::prelude::*;
//!
//! let mut config = AppConfig::from_toml_str("[metrics]\nrisk_free_rate = 0.07\n").unwrap();
//! apply_override(&mut config, "metrics.periods_per_year", "52").unwrap();
//!
//! assert!(config.is_valid());
//! assert_eq!(config.metrics.periods_per_year, 52);
//! assert!(apply_override(&mut config, "metrics.unknown", "1").is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod app;
pub mod error;
pub mod overrides;
pub mod settings;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::app::AppConfig;
    pub use crate::error::{ConfigError, ConfigResult, Validate, ValidationError};
    pub use crate::overrides::{apply_assignments, apply_override};
    pub use crate::settings::{LoaderSettings, ViewSettings};
}

pub use app::AppConfig;
pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use overrides::{apply_assignments, apply_override};
pub use settings::{LoaderSettings, ViewSettings};
