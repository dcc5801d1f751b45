//! # PMS Hub Loader
//!
//! Turns raw rows from CRM exports, PMS exports and the dashboard upload
//! template into a validated, versioned [`Dataset`](pmshub_core::Dataset).
//!
//! - **Mapping**: explicit per-source header tables ([`fields`]) and per-load
//!   options ([`MappingConfig`])
//! - **Typed rows**: one variant per source ([`SourceRow`]), with coercion of
//!   amounts, dates and integers ([`coerce`])
//! - **Load and merge**: [`load`] collects rejected rows instead of failing,
//!   applies the merge policy, reconciles corpus figures and audits every row
//! - **Store**: [`DatasetStore`] publishes merged datasets to readers
//! - **I/O**: CSV and JSON row readers, a data-directory loader and a seeded
//!   sample generator
//!
//! ## Example
//!
//! ```rust
//! use pmshub_core::MergeMode;
//! use pmshub_loader::prelude::*;
//!
//! let rows = vec![
//!     RawRow::new("r1")
//!         .with("client_id", "C1")
//!         .with("period_end_date", "31/03/2024")
//!         .with("ending_value", "₹1,50,000"),
//! ];
//! let config = MappingConfig::new(SourceKind::Pms)
//!     .with_date_format("%d/%m/%Y")
//!     .with_merge_mode(MergeMode::Overwrite);
//!
//! let report = load(&rows, &config).unwrap();
//! assert_eq!(report.dataset.snapshot_count(), 1);
//! assert!(report.rejected.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::uninlined_format_args)]

pub mod audit;
pub mod coerce;
pub mod datadir;
pub mod error;
pub mod fields;
pub mod load;
pub mod mapping;
pub mod raw;
pub mod reader;
pub mod rows;
pub mod sample;
pub mod store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::audit::{AuditEntry, AuditOutcome, AuditSink, LogAuditSink, MemoryAuditSink};
    pub use crate::datadir::{load_data_dir, DataDir};
    pub use crate::error::{LoadError, LoadResult};
    pub use crate::load::{load, load_with_audit, merge_into, reconcile_all, LoadReport, RejectedRow};
    pub use crate::mapping::{MappingConfig, PmsTable, SourceKind};
    pub use crate::raw::{RawRow, RawValue};
    pub use crate::reader::{read_benchmark_csv, read_csv_rows, read_json_rows};
    pub use crate::rows::{CrmRow, PmsRow, SourceRow, UploadRow};
    pub use crate::sample::{generate, SampleConfig, SampleData};
    pub use crate::store::DatasetStore;
}

pub use error::{LoadError, LoadResult};
pub use load::{load, load_with_audit, merge_into, LoadReport, RejectedRow};
pub use mapping::{MappingConfig, PmsTable, SourceKind};
pub use raw::{RawRow, RawValue};
pub use rows::SourceRow;
pub use store::DatasetStore;
