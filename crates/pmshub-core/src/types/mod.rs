//! Domain types for portfolio reporting.
//!
//! - [`Date`]: Calendar date
//! - [`ClientId`], [`RmId`]: Identifiers
//! - [`ClientRecord`]: Client master data
//! - [`PortfolioSnapshot`], [`SnapshotSeries`]: Dated valuations
//! - [`CashflowEvent`]: External money movements
//! - [`BenchmarkSeries`]: Benchmark index levels

mod benchmark;
mod cashflow;
mod client;
mod date;
mod ids;
mod snapshot;

pub use benchmark::BenchmarkSeries;
pub use cashflow::{CashflowEvent, FlowDirection};
pub use client::{ClientRecord, RiskProfile};
pub use date::Date;
pub use ids::{ClientId, RmId};
pub use snapshot::{PortfolioSnapshot, Reconciliation, SnapshotSeries};
