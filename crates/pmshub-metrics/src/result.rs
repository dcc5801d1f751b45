//! Typed metric outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

use pmshub_core::{ClientId, Date};

use crate::drawdown::DrawdownDetail;
use crate::error::{MetricsError, MetricsResult};
use crate::hwm::HighWaterMarkDetail;
use crate::kind::MetricKind;

/// The date range and observation count a metric was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationWindow {
    /// First date used.
    pub start: Date,
    /// Last date used.
    pub end: Date,
    /// Observations used (snapshots, returns or cashflows).
    pub observations: usize,
}

impl ComputationWindow {
    /// Creates a window.
    #[must_use]
    pub fn new(start: Date, end: Date, observations: usize) -> Self {
        Self {
            start,
            end,
            observations,
        }
    }
}

/// What a metric computation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricOutcome {
    /// A value and the window it covers.
    Value {
        /// Computed value.
        value: f64,
        /// Window actually used.
        window: ComputationWindow,
    },
    /// Too few observations.
    InsufficientData {
        /// What was missing.
        reason: String,
    },
    /// The XIRR solver did not converge.
    NonConvergent {
        /// Iterations used.
        iterations: u32,
        /// Final |NPV|.
        residual: f64,
    },
    /// Mathematically undefined (e.g. zero variance).
    Undefined {
        /// Why.
        reason: String,
    },
}

impl MetricOutcome {
    /// Value outcome.
    #[must_use]
    pub fn value(value: f64, window: ComputationWindow) -> Self {
        MetricOutcome::Value { value, window }
    }

    /// Insufficient-data outcome.
    #[must_use]
    pub fn insufficient(reason: impl Into<String>) -> Self {
        MetricOutcome::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Undefined outcome.
    #[must_use]
    pub fn undefined(reason: impl Into<String>) -> Self {
        MetricOutcome::Undefined {
            reason: reason.into(),
        }
    }

    /// The value, if one was computed.
    #[must_use]
    pub fn as_value(&self) -> Option<f64> {
        match self {
            MetricOutcome::Value { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The window, if a value was computed.
    #[must_use]
    pub fn window(&self) -> Option<ComputationWindow> {
        match self {
            MetricOutcome::Value { window, .. } => Some(*window),
            _ => None,
        }
    }

    /// True for a computed value.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, MetricOutcome::Value { .. })
    }

    /// Converts to a hard value, mapping every other outcome to an error.
    pub fn into_value(self, metric: MetricKind) -> MetricsResult<f64> {
        match self {
            MetricOutcome::Value { value, .. } => Ok(value),
            MetricOutcome::InsufficientData { reason } => Err(MetricsError::InsufficientData {
                metric: metric.to_string(),
                reason,
            }),
            MetricOutcome::NonConvergent {
                iterations,
                residual,
            } => Err(MetricsError::NonConvergence {
                iterations,
                residual,
            }),
            MetricOutcome::Undefined { reason } => Err(MetricsError::Undefined {
                metric: metric.to_string(),
                reason,
            }),
        }
    }
}

impl fmt::Display for MetricOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricOutcome::Value { value, .. } => write!(f, "{value:.6}"),
            _ => write!(f, "N/A"),
        }
    }
}

/// Who a metric was computed for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Subject {
    /// A single client.
    Client(ClientId),
    /// An aggregate group (RM, category, ...).
    Group(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Client(id) => write!(f, "{id}"),
            Subject::Group(key) => write!(f, "group:{key}"),
        }
    }
}

/// Supplementary detail for metrics that have more to say than one number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDetail {
    /// Peak, trough and recovery of the maximum drawdown.
    Drawdown(DrawdownDetail),
    /// Running-max series and distance from the current high-water mark.
    HighWaterMark(HighWaterMarkDetail),
}

/// One metric for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Client or group.
    pub subject: Subject,
    /// Which metric.
    pub metric: MetricKind,
    /// Value or typed shortfall.
    pub outcome: MetricOutcome,
    /// Optional detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<MetricDetail>,
}

impl MetricResult {
    /// Creates a result without detail.
    #[must_use]
    pub fn new(subject: Subject, metric: MetricKind, outcome: MetricOutcome) -> Self {
        Self {
            subject,
            metric,
            outcome,
            detail: None,
        }
    }

    /// Attaches detail.
    #[must_use]
    pub fn with_detail(mut self, detail: MetricDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_value_maps_outcomes() {
        let d = Date::from_ymd(2024, 1, 1).unwrap();
        let ok = MetricOutcome::value(0.1, ComputationWindow::new(d, d, 2));
        assert_eq!(ok.into_value(MetricKind::Cagr).unwrap(), 0.1);

        let err = MetricOutcome::insufficient("one snapshot")
            .into_value(MetricKind::Cagr)
            .unwrap_err();
        assert!(matches!(err, MetricsError::InsufficientData { .. }));

        let err = MetricOutcome::NonConvergent {
            iterations: 100,
            residual: 0.5,
        }
        .into_value(MetricKind::Xirr)
        .unwrap_err();
        assert!(matches!(err, MetricsError::NonConvergence { iterations: 100, .. }));
    }

    #[test]
    fn test_display_na() {
        assert_eq!(MetricOutcome::undefined("zero variance").to_string(), "N/A");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&MetricOutcome::insufficient("x")).unwrap();
        assert!(json.contains("\"status\":\"insufficient_data\""));
    }
}
