//! # PMS Hub Core
//!
//! Core data model for the PMS Hub portfolio reporting core.
//!
//! This crate provides the foundational building blocks used by every other
//! PMS Hub crate:
//!
//! - **Types**: [`Date`], [`ClientRecord`], [`PortfolioSnapshot`], [`CashflowEvent`],
//!   [`BenchmarkSeries`]
//! - **Dataset**: the canonical, versioned in-memory [`Dataset`] and its merge rules
//! - **Year bases**: how elapsed time between two dates becomes a year fraction
//! - **Memo**: a version-keyed memoization cache shared by the metrics and filter engines
//!
//! ## Example
//!
//! ```rust
//! use pmshub_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let mut dataset = Dataset::new();
//! let client = ClientRecord::new(ClientId::new("C001"), "Asha Rao");
//! dataset.upsert_client(client, MergeMode::Merge);
//!
//! let date = Date::from_ymd(2024, 3, 31).unwrap();
//! let snapshot = PortfolioSnapshot::new(ClientId::new("C001"), date, dec!(1500000));
//! dataset.upsert_snapshot(snapshot, MergeMode::Merge);
//!
//! assert_eq!(dataset.latest_aum(&ClientId::new("C001")), Some(dec!(1500000)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::needless_pass_by_value)]

pub mod dataset;
pub mod error;
pub mod memo;
pub mod types;
pub mod year_basis;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::dataset::{Dataset, MergeMode, MergeOutcome, MergeSummary};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::memo::{MemoStats, VersionedMemo};
    pub use crate::types::{
        BenchmarkSeries, CashflowEvent, ClientId, ClientRecord, Date, FlowDirection,
        PortfolioSnapshot, Reconciliation, RiskProfile, RmId, SnapshotSeries,
    };
    pub use crate::year_basis::YearBasis;
}

// Re-export commonly used types at crate root
pub use dataset::{Dataset, MergeMode, MergeOutcome};
pub use error::{CoreError, CoreResult};
pub use memo::{MemoStats, VersionedMemo};
pub use types::{
    BenchmarkSeries, CashflowEvent, ClientId, ClientRecord, Date, FlowDirection,
    PortfolioSnapshot, Reconciliation, RiskProfile, RmId, SnapshotSeries,
};
pub use year_basis::YearBasis;
