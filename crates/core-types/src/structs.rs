use crate::enums::MetricCategory;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// Experiment input
// ==============================================================================

/// One paired observation of a metric at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub treatment_value: f64,
    pub control_value: f64,
    /// Number of subjects contributing to the treatment value. Malformed input may
    /// carry zero or negative counts; validation rejects them.
    pub treatment_sample_size: i64,
    pub control_sample_size: i64,
}

/// Summary the upstream generator attaches to each metric. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub treatment_mean: f64,
    pub control_mean: f64,
    pub total_treatment_samples: i64,
    pub total_control_samples: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub time_series: Vec<TimeSeriesPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<MetricSummary>,
}

impl MetricSeries {
    pub fn new(time_series: Vec<TimeSeriesPoint>) -> Self {
        Self {
            time_series,
            summary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentPeriod {
    pub start_date: String,
    pub end_date: String,
    /// Number of hourly data points the experiment ran for.
    pub total_hours: u32,
}

impl ExperimentPeriod {
    /// Exact (possibly fractional) duration in days, used for annualization.
    pub fn duration_days_exact(&self) -> Decimal {
        Decimal::from(self.total_hours) / Decimal::from(24)
    }

    /// Duration in whole days, rounded up.
    pub fn duration_days(&self) -> u32 {
        self.total_hours.div_ceil(24)
    }
}

/// Everything an upstream results provider produces for one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentResult {
    pub experiment_id: String,
    /// Metric id to series. Iteration order is the order the map was built in.
    pub metrics: IndexMap<String, MetricSeries>,
    /// When the upstream result was produced. Together with `experiment_id` this
    /// identifies a result for deduplication.
    pub generated_at: String,
    pub experiment_period: ExperimentPeriod,
}

/// The period as reported on an analysis, with the duration already in days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPeriod {
    pub start_date: String,
    pub end_date: String,
    pub duration_days: u32,
}

impl From<&ExperimentPeriod> for AnalysisPeriod {
    fn from(period: &ExperimentPeriod) -> Self {
        Self {
            start_date: period.start_date.clone(),
            end_date: period.end_date.clone(),
            duration_days: period.duration_days(),
        }
    }
}

// ==============================================================================
// Pricing
// ==============================================================================

/// Optional constraints an operator can put on a metric's dollar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
}

/// Live, editable economic value of one unit of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub metric_id: String,
    pub dollars_per_unit: Decimal,
    pub unit: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: MetricCategory,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
}

impl MetricValue {
    /// Freezes the fields an analysis depends on.
    pub fn snapshot(&self) -> MetricValueSnapshot {
        MetricValueSnapshot {
            dollars_per_unit: self.dollars_per_unit,
            description: self.description.clone(),
            unit: self.unit.clone(),
        }
    }

    /// Checks `dollars_per_unit` against the metric's own validation rules, if any.
    pub fn check_rules(&self) -> Result<(), CoreError> {
        let Some(rules) = &self.validation_rules else {
            return Ok(());
        };
        let value = self.dollars_per_unit;
        let violation = |rule: String| CoreError::RuleViolation {
            metric_id: self.metric_id.clone(),
            value: value.to_string(),
            rule,
        };

        if let Some(min) = rules.min_value {
            if value < min {
                return Err(violation(format!("minimum is {}", min)));
            }
        }
        if let Some(max) = rules.max_value {
            if value > max {
                return Err(violation(format!("maximum is {}", max)));
            }
        }
        if let Some(places) = rules.decimal_places {
            if value.normalize().scale() > places {
                return Err(violation(format!("at most {} decimal places", places)));
            }
        }
        Ok(())
    }
}

/// Immutable copy of a metric's pricing, captured when an analysis runs so later
/// edits to the live configuration never change a historical result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValueSnapshot {
    pub dollars_per_unit: Decimal,
    pub description: String,
    pub unit: String,
}

/// Metric id to pricing snapshot, in capture order.
pub type MetricValueSnapshots = IndexMap<String, MetricValueSnapshot>;

// ==============================================================================
// Exclusions
// ==============================================================================

/// Why a metric was left out of the statistical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExclusionReason {
    /// The series failed validation. Every failed check is listed.
    DataQuality { errors: Vec<String> },
    /// Valid data, but a sample total is below the configured minimum.
    InsufficientPower {
        treatment: i64,
        control: i64,
        minimum: i64,
    },
    /// The estimator failed unexpectedly for this metric.
    Computation { message: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::DataQuality { errors } => {
                write!(f, "data quality: {}", errors.join("; "))
            }
            ExclusionReason::InsufficientPower {
                treatment,
                control,
                minimum,
            } => write!(
                f,
                "insufficient sample size (treatment {}, control {}, minimum {})",
                treatment, control, minimum
            ),
            ExclusionReason::Computation { message } => write!(f, "computation failed: {}", message),
        }
    }
}
