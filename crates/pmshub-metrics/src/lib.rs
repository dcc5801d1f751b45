//! # PMS Hub Metrics
//!
//! Performance metrics for client portfolios and client groups.
//!
//! - **Growth**: CAGR ([`cagr`]) and money-weighted XIRR ([`xirr`])
//! - **Risk**: volatility, Sharpe, Sortino, alpha/beta, tracking error,
//!   information ratio and Calmar ([`risk`])
//! - **Path**: maximum drawdown ([`drawdown`]) and high-water mark ([`hwm`])
//!
//! Every metric reports a [`MetricOutcome`]: either a value with the window
//! it was computed over, or a typed reason why no value exists. A single
//! snapshot, a flat benchmark or a solver that will not converge never
//! panics and never produces a silent `NaN`.
//!
//! ## Example
//!
//! ```rust
//! use pmshub_core::prelude::*;
//! use pmshub_metrics::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let mut dataset = Dataset::new();
//! let id = ClientId::new("C001");
//! for (y, aum) in [(2021, dec!(100)), (2022, dec!(110)), (2023, dec!(121))] {
//!     let date = Date::from_ymd(y, 3, 31).unwrap();
//!     dataset.upsert_snapshot(PortfolioSnapshot::new(id.clone(), date, aum), MergeMode::Merge);
//! }
//!
//! let series = ClientSeries::for_client(&dataset, &id).unwrap();
//! let results = compute_metrics(&series, &MetricSet::standard(), None, &MetricsConfig::default())
//!     .unwrap();
//!
//! let cagr = results.iter().find(|r| r.metric == MetricKind::Cagr).unwrap();
//! assert!((cagr.outcome.as_value().unwrap() - 0.10).abs() < 1e-9);
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
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::similar_names)]
#![allow(clippy::float_cmp)]
#![allow(clippy::uninlined_format_args)]

pub mod cache;
pub mod cagr;
pub mod config;
pub mod drawdown;
pub mod engine;
pub mod error;
pub mod hwm;
pub mod kind;
pub mod result;
pub mod returns;
pub mod risk;
pub mod series;
pub mod xirr;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::cache::MetricsCache;
    pub use crate::config::{MetricsConfig, XirrConfig};
    pub use crate::drawdown::DrawdownDetail;
    pub use crate::engine::{compute_for_dataset, compute_metrics};
    pub use crate::error::{MetricsError, MetricsResult};
    pub use crate::hwm::HighWaterMarkDetail;
    pub use crate::kind::{MetricKind, MetricSet};
    pub use crate::result::{ComputationWindow, MetricDetail, MetricOutcome, MetricResult, Subject};
    pub use crate::returns::PeriodReturn;
    pub use crate::series::{ClientSeries, FlowPoint, ValuePoint};
}

pub use cache::MetricsCache;
pub use config::MetricsConfig;
pub use engine::{compute_for_dataset, compute_metrics};
pub use error::{MetricsError, MetricsResult};
pub use kind::{MetricKind, MetricSet};
pub use result::{ComputationWindow, MetricOutcome, MetricResult, Subject};
pub use series::ClientSeries;
