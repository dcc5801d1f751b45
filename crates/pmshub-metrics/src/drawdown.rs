//! Maximum drawdown with peak, trough and recovery dates.

use serde::{Deserialize, Serialize};

use pmshub_core::Date;

use crate::result::{ComputationWindow, MetricOutcome};
use crate::series::ValuePoint;

/// Where and how deep the worst decline was.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownDetail {
    /// Worst decline as a fraction in `[-1, 0]`.
    pub max_drawdown: f64,
    /// Date of the peak preceding the trough.
    pub peak_date: Date,
    /// Value at the peak.
    pub peak_value: f64,
    /// Date of the trough.
    pub trough_date: Date,
    /// Value at the trough.
    pub trough_value: f64,
    /// First date after the trough at or above the peak value.
    pub recovery_date: Option<Date>,
    /// Days from peak to recovery, or to the last valuation if not recovered.
    pub duration_days: i64,
}

/// Scans a value series for its maximum drawdown.
///
/// `None` for fewer than two valuations. A series that never declines
/// reports a zero drawdown anchored at its first point.
#[must_use]
pub fn drawdown_detail(values: &[ValuePoint]) -> Option<DrawdownDetail> {
    if values.len() < 2 {
        return None;
    }

    let mut peak = values[0];
    let mut worst = 0.0_f64;
    let mut worst_peak = values[0];
    let mut worst_trough = values[0];

    for &point in values {
        if point.value > peak.value {
            peak = point;
        }
        if peak.value > 0.0 {
            let dd = ((point.value - peak.value) / peak.value).max(-1.0);
            if dd < worst {
                worst = dd;
                worst_peak = peak;
                worst_trough = point;
            }
        }
    }

    let recovery_date = values
        .iter()
        .filter(|p| p.date > worst_trough.date && p.value >= worst_peak.value)
        .map(|p| p.date)
        .next();
    let last_date = values[values.len() - 1].date;
    let duration_days = if worst < 0.0 {
        worst_peak
            .date
            .days_between(&recovery_date.unwrap_or(last_date))
    } else {
        0
    };

    Some(DrawdownDetail {
        max_drawdown: worst,
        peak_date: worst_peak.date,
        peak_value: worst_peak.value,
        trough_date: worst_trough.date,
        trough_value: worst_trough.value,
        recovery_date: if worst < 0.0 { recovery_date } else { None },
        duration_days,
    })
}

/// Maximum drawdown as a metric outcome, with its detail.
#[must_use]
pub fn max_drawdown(values: &[ValuePoint]) -> (MetricOutcome, Option<DrawdownDetail>) {
    match drawdown_detail(values) {
        Some(detail) => {
            let window = ComputationWindow::new(values[0].date, values[values.len() - 1].date, values.len());
            (MetricOutcome::value(detail.max_drawdown, window), Some(detail))
        }
        None => (
            MetricOutcome::insufficient(format!(
                "drawdown needs two valuations, have {}",
                values.len()
            )),
            None,
        ),
    }
}
