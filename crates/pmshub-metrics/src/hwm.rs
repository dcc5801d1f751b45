//! High-water mark tracking.

use serde::{Deserialize, Serialize};

use pmshub_core::Date;

use crate::result::{ComputationWindow, MetricOutcome};
use crate::series::ValuePoint;

/// Running maximum and the distance from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighWaterMarkDetail {
    /// Running maximum at every valuation date.
    pub series: Vec<(Date, f64)>,
    /// Highest value reached.
    pub current_hwm: f64,
    /// Last date the high-water mark was set or matched.
    pub hwm_date: Date,
    /// Days from `hwm_date` to the last valuation.
    pub days_since_hwm: i64,
    /// `(last - hwm) / hwm`, zero when the HWM is not positive.
    pub drawdown_from_hwm: f64,
}

/// Running-max series for a value series. `None` when empty.
#[must_use]
pub fn high_water_mark_detail(values: &[ValuePoint]) -> Option<HighWaterMarkDetail> {
    let last = *values.last()?;
    let mut running = f64::NEG_INFINITY;
    let mut hwm_date = values[0].date;
    let mut series = Vec::with_capacity(values.len());

    for point in values {
        if point.value >= running {
            running = point.value;
            hwm_date = point.date;
        }
        series.push((point.date, running));
    }

    let drawdown_from_hwm = if running > 0.0 {
        (last.value - running) / running
    } else {
        0.0
    };

    Some(HighWaterMarkDetail {
        series,
        current_hwm: running,
        hwm_date,
        days_since_hwm: hwm_date.days_between(&last.date),
        drawdown_from_hwm,
    })
}

/// High-water mark as a metric outcome, with its detail.
#[must_use]
pub fn high_water_mark(values: &[ValuePoint]) -> (MetricOutcome, Option<HighWaterMarkDetail>) {
    if values.len() < 2 {
        return (
            MetricOutcome::insufficient(format!(
                "high-water mark needs two valuations, have {}",
                values.len()
            )),
            None,
        );
    }
    match high_water_mark_detail(values) {
        Some(detail) => {
            let window = ComputationWindow::new(values[0].date, values[values.len() - 1].date, values.len());
            (MetricOutcome::value(detail.current_hwm, window), Some(detail))
        }
        None => (MetricOutcome::insufficient("no valuations"), None),
    }
}
