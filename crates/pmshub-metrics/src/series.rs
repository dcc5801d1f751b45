//! Per-client and per-group value/cashflow series.
//!
//! The engine works in `f64`: AUM and cashflow amounts are converted from
//! `Decimal` once, here, after the series has been validated.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use pmshub_core::{ClientId, Dataset, Date};

use crate::error::{MetricsError, MetricsResult};
use crate::result::Subject;
use crate::returns::{periodic_returns, PeriodReturn};

/// A dated portfolio value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// Valuation date.
    pub date: Date,
    /// Portfolio value.
    pub value: f64,
}

/// A dated external cashflow, positive into the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowPoint {
    /// Value date.
    pub date: Date,
    /// Signed amount.
    pub amount: f64,
}

/// Chronological values and cashflows for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSeries {
    subject: Subject,
    values: Vec<ValuePoint>,
    flows: Vec<FlowPoint>,
    growth: Option<Vec<ValuePoint>>,
}

impl ClientSeries {
    /// Builds a series, validating its shape.
    ///
    /// # Errors
    ///
    /// `MetricsError::MalformedInput` if value dates are not strictly
    /// increasing or any number is non-finite. Flows are sorted by date.
    pub fn new(
        subject: Subject,
        values: Vec<ValuePoint>,
        mut flows: Vec<FlowPoint>,
    ) -> MetricsResult<Self> {
        if let Some(pair) = values.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(MetricsError::malformed(format!(
                "{subject}: value dates not strictly increasing ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
        if let Some(p) = values.iter().find(|p| !p.value.is_finite()) {
            return Err(MetricsError::malformed(format!(
                "{subject}: non-finite value on {}",
                p.date
            )));
        }
        if let Some(f) = flows.iter().find(|f| !f.amount.is_finite()) {
            return Err(MetricsError::malformed(format!(
                "{subject}: non-finite cashflow on {}",
                f.date
            )));
        }
        flows.sort_by_key(|f| f.date);
        Ok(Self {
            subject,
            values,
            flows,
            growth: None,
        })
    }

    /// Series for one client of `dataset`.
    pub fn for_client(dataset: &Dataset, id: &ClientId) -> MetricsResult<Self> {
        let values = dataset
            .snapshots(id)
            .iter()
            .map(|s| -> MetricsResult<ValuePoint> {
                Ok(ValuePoint {
                    date: s.as_of,
                    value: to_f64(s.aum)?,
                })
            })
            .collect::<MetricsResult<Vec<_>>>()?;
        let flows = dataset
            .cashflows(id)
            .iter()
            .map(|c| -> MetricsResult<FlowPoint> {
                Ok(FlowPoint {
                    date: c.date,
                    amount: to_f64(c.amount)?,
                })
            })
            .collect::<MetricsResult<Vec<_>>>()?;
        Self::new(Subject::Client(id.clone()), values, flows)
    }

    /// Series for every client of `dataset` taken together.
    ///
    /// Group value on each date in the union of member snapshot dates is the
    /// sum of each member's latest AUM on or before that date. Cashflows are
    /// concatenated. A member with no cashflow dated on or before its first
    /// valuation is treated as contributing that valuation on that date, so
    /// a client joining the group later does not register as growth.
    ///
    /// Growth-based metrics read [`growth_values`](Self::growth_values): the
    /// flow-adjusted returns chained from the opening group value.
    pub fn for_group(key: impl Into<String>, dataset: &Dataset) -> MetricsResult<Self> {
        let ids = dataset.client_ids();
        let dates: BTreeSet<Date> = ids
            .iter()
            .flat_map(|id| dataset.snapshots(id).iter().map(|s| s.as_of))
            .collect();

        let mut values = Vec::with_capacity(dates.len());
        for date in dates {
            let total: Decimal = ids
                .iter()
                .filter_map(|id| dataset.snapshot_series(id)?.as_of(date))
                .map(|s| s.aum)
                .sum();
            values.push(ValuePoint {
                date,
                value: to_f64(total)?,
            });
        }

        let mut flows = Vec::new();
        for id in &ids {
            let recorded = dataset.cashflows(id);
            for c in recorded {
                flows.push(FlowPoint {
                    date: c.date,
                    amount: to_f64(c.amount)?,
                });
            }
            if let Some(first) = dataset.snapshots(id).first() {
                if !recorded.iter().any(|c| c.date <= first.as_of) {
                    flows.push(FlowPoint {
                        date: first.as_of,
                        amount: to_f64(first.aum)?,
                    });
                }
            }
        }

        let mut series = Self::new(Subject::Group(key.into()), values, flows)?;
        series.growth = Some(growth_index(&series.values, &series.flows));
        Ok(series)
    }

    /// Who the series belongs to.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Values in date order.
    #[must_use]
    pub fn values(&self) -> &[ValuePoint] {
        &self.values
    }

    /// Cashflows in date order.
    #[must_use]
    pub fn flows(&self) -> &[FlowPoint] {
        &self.flows
    }

    /// Values that CAGR and drawdown are measured on.
    ///
    /// The recorded values for a client; the chained growth index for a
    /// group.
    #[must_use]
    pub fn growth_values(&self) -> &[ValuePoint] {
        self.growth.as_deref().unwrap_or(&self.values)
    }

    /// Flow-adjusted returns between consecutive values.
    #[must_use]
    pub fn periodic_returns(&self) -> Vec<PeriodReturn> {
        periodic_returns(&self.values, &self.flows)
    }

    /// Mean spacing between consecutive valuations, in days.
    #[must_use]
    pub fn mean_spacing_days(&self) -> Option<f64> {
        let (first, last) = (self.values.first()?, self.values.last()?);
        if self.values.len() < 2 {
            return None;
        }
        Some(first.date.days_between(&last.date) as f64 / (self.values.len() - 1) as f64)
    }
}

/// Flow-adjusted returns chained from the first value, on the value dates.
///
/// The level is held flat across a period whose return is undefined.
fn growth_index(values: &[ValuePoint], flows: &[FlowPoint]) -> Vec<ValuePoint> {
    let Some(first) = values.first() else {
        return Vec::new();
    };
    let returns = periodic_returns(values, flows);
    let mut level = first.value;
    let mut out = Vec::with_capacity(values.len());
    out.push(*first);
    for point in &values[1..] {
        if let Some(r) = returns.iter().find(|r| r.end == point.date) {
            level *= 1.0 + r.value;
        }
        out.push(ValuePoint {
            date: point.date,
            value: level,
        });
    }
    out
}

fn to_f64(value: Decimal) -> MetricsResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| MetricsError::malformed(format!("{value} not representable as f64")))
}
