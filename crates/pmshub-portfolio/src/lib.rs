//! # PMS Hub Portfolio
//!
//! Filter and aggregation engine behind the dashboard views.
//!
//! - **Filters**: [`FilterSpec`] is a canonical AND of typed predicates over
//!   client attributes and latest valuations
//! - **Aggregates**: client count, AUM statistics, corpus totals and
//!   breakdowns by category, RM, risk profile, city and AUM band
//! - **Grouping**: [`partition`] splits a dataset into per-group datasets for
//!   group-level metrics
//! - **Views**: [`apply_filter`] is pure; [`ViewCache`] memoizes it by dataset
//!   version and spec
//!
//! Aggregates are always recomputed from the filtered subset. An empty
//! subset yields zeroed aggregates with `no_data` set.
//!
//! ## Example
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use pmshub_core::prelude::*;
//! use pmshub_portfolio::prelude::*;
//!
//! let date = Date::from_ymd(2024, 3, 31).unwrap();
//! let mut ds = Dataset::new();
//! ds.upsert_client(
//!     ClientRecord::new(ClientId::new("C1"), "Asha Rao").with_category("Equity"),
//!     MergeMode::Merge,
//! );
//! ds.upsert_snapshot(PortfolioSnapshot::new(ClientId::new("C1"), date, dec!(2500000)), MergeMode::Merge);
//!
//! let spec = FilterSpec::new([Predicate::equals(FilterField::Category, "equity")]).unwrap();
//! let view = apply_filter(&ds, &spec);
//!
//! assert_eq!(view.aggregates.by_category.get("Equity").unwrap().count, 1);
//! assert_eq!(view.aggregates.by_aum_band.get("10 L - 50 L").unwrap().count, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]

pub mod aggregate;
pub mod bucketing;
pub mod error;
pub mod facts;
pub mod filter;
pub mod partition;
pub mod view;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::aggregate::{Aggregates, AumStats, CorpusTotals};
    pub use crate::bucketing::{AumBands, BucketMetrics, Distribution};
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::facts::ClientFacts;
    pub use crate::filter::{FilterField, FilterOp, FilterSpec, FilterValue, Predicate};
    pub use crate::partition::{partition, GroupBy, UNASSIGNED};
    pub use crate::view::{apply_filter, apply_filter_with, FilterOutcome, ViewCache};
}

pub use aggregate::Aggregates;
pub use error::{FilterError, FilterResult};
pub use facts::ClientFacts;
pub use filter::{FilterField, FilterSpec, Predicate};
pub use partition::{partition, GroupBy};
pub use view::{apply_filter, FilterOutcome, ViewCache};
