use crate::error::AnalyticsError;
use crate::report::{ConfidenceInterval, DidResult};
use crate::stats;
use core_types::{EffectMagnitude, TimeSeriesPoint};
use std::fmt;

/// Significance threshold used when the caller does not supply one.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Confidence level, in percent, used when the caller does not supply one.
pub const DEFAULT_CONFIDENCE_LEVEL: u32 = 95;

/// Smallest summed sample size per arm that validation accepts.
pub const MIN_TOTAL_SAMPLES: i64 = 10;

/// A single reason a time series is not fit for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptySeries,
    TooFewPoints,
    NonFiniteValue { index: usize },
    NonPositiveSampleSize { index: usize },
    TreatmentSamplesTooSmall { total: i64 },
    ControlSamplesTooSmall { total: i64 },
    SampleSizeOverflow,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptySeries => write!(f, "Time series data is empty"),
            ValidationIssue::TooFewPoints => {
                write!(f, "Need at least 2 data points for meaningful analysis")
            }
            ValidationIssue::NonFiniteValue { index } => {
                write!(f, "Invalid values at time point {}", index)
            }
            ValidationIssue::NonPositiveSampleSize { index } => {
                write!(f, "Invalid sample sizes at time point {}", index)
            }
            ValidationIssue::TreatmentSamplesTooSmall { total } => write!(
                f,
                "Treatment group sample size too small ({} < {})",
                total, MIN_TOTAL_SAMPLES
            ),
            ValidationIssue::ControlSamplesTooSmall { total } => write!(
                f,
                "Control group sample size too small ({} < {})",
                total, MIN_TOTAL_SAMPLES
            ),
            ValidationIssue::SampleSizeOverflow => {
                write!(f, "Summed sample sizes exceed the supported range")
            }
        }
    }
}

/// Itemized outcome of `DidEstimator::validate`. Empty means the series is usable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The issues rendered as human-readable strings.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// A stateless calculator for Differences-in-Differences statistics of one metric.
#[derive(Debug, Default, Clone, Copy)]
pub struct DidEstimator {}

impl DidEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether a series can support a DiD estimate.
    ///
    /// Never fails: every problem found is returned in the report so callers can show
    /// exactly why a metric was left out.
    pub fn validate(&self, time_series: &[TimeSeriesPoint]) -> ValidationReport {
        let mut errors = Vec::new();

        if time_series.is_empty() {
            errors.push(ValidationIssue::EmptySeries);
        }
        if time_series.len() < 2 {
            errors.push(ValidationIssue::TooFewPoints);
        }

        for (index, point) in time_series.iter().enumerate() {
            if !point.treatment_value.is_finite() || !point.control_value.is_finite() {
                errors.push(ValidationIssue::NonFiniteValue { index });
            }
            if point.treatment_sample_size <= 0 || point.control_sample_size <= 0 {
                errors.push(ValidationIssue::NonPositiveSampleSize { index });
            }
        }

        match sample_totals(time_series) {
            Some((treatment_total, control_total)) => {
                if treatment_total < MIN_TOTAL_SAMPLES {
                    errors.push(ValidationIssue::TreatmentSamplesTooSmall {
                        total: treatment_total,
                    });
                }
                if control_total < MIN_TOTAL_SAMPLES {
                    errors.push(ValidationIssue::ControlSamplesTooSmall {
                        total: control_total,
                    });
                }
            }
            None => errors.push(ValidationIssue::SampleSizeOverflow),
        }

        ValidationReport { errors }
    }

    /// The main entry point for calculating the DiD statistics of one metric.
    ///
    /// # Arguments
    ///
    /// * `time_series` - The paired observations for the metric.
    /// * `confidence_level` - Confidence level in percent; 90, 95 and 99 have exact
    ///   critical values, anything else falls back to 95%.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DidResult`, or `AnalyticsError::EmptySeries` when
    /// there is nothing to analyse. Callers are expected to `validate` first.
    pub fn calculate(
        &self,
        time_series: &[TimeSeriesPoint],
        confidence_level: u32,
    ) -> Result<DidResult, AnalyticsError> {
        if time_series.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }

        let treatment: Vec<f64> = time_series.iter().map(|p| p.treatment_value).collect();
        let control: Vec<f64> = time_series.iter().map(|p| p.control_value).collect();

        let treatment_mean = stats::mean(&treatment);
        let control_mean = stats::mean(&control);
        let absolute_difference = treatment_mean - control_mean;
        let relative_difference = if control_mean != 0.0 {
            absolute_difference / control_mean
        } else {
            0.0
        };

        let (sample_size_treatment, sample_size_control) =
            sample_totals(time_series).ok_or(AnalyticsError::SampleSizeOverflow)?;

        let t_stat = stats::t_statistic(&treatment, &control);
        let df = stats::degrees_of_freedom(treatment.len(), control.len());
        let p_value = stats::approximate_p_value(t_stat, df);

        let effect_size = stats::cohens_d(&treatment, &control);

        let combined_se = stats::combined_standard_error(&treatment, &control);
        let confidence_interval: ConfidenceInterval =
            stats::confidence_interval(absolute_difference, combined_se, confidence_level).into();

        ensure_finite("treatment_mean", treatment_mean)?;
        ensure_finite("control_mean", control_mean)?;
        ensure_finite("relative_difference", relative_difference)?;
        ensure_finite("effect_size", effect_size)?;
        ensure_finite("confidence_interval", confidence_interval.width())?;

        Ok(DidResult {
            treatment_mean,
            control_mean,
            absolute_difference,
            relative_difference,
            p_value,
            confidence_level,
            confidence_interval,
            sample_size_control,
            sample_size_treatment,
            effect_size,
        })
    }
}

/// `p_value < alpha`.
pub fn is_significant(p_value: f64, alpha: f64) -> bool {
    p_value < alpha
}

/// Buckets Cohen's d by magnitude: below 0.2 negligible, below 0.5 small, below 0.8
/// medium, otherwise large. The sign is ignored.
pub fn interpret_effect_size(cohens_d: f64) -> EffectMagnitude {
    let abs_d = cohens_d.abs();
    if abs_d < 0.2 {
        EffectMagnitude::Negligible
    } else if abs_d < 0.5 {
        EffectMagnitude::Small
    } else if abs_d < 0.8 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

/// Rough power estimate at alpha = 0.05 from a z-score table.
///
/// `z_beta = sqrt(n) * |d| - 1.96` is mapped onto seven fixed power values; it is a
/// planning aid, not a substitute for a proper power analysis.
pub fn estimate_statistical_power(effect_size: f64, sample_size: i64) -> f64 {
    let z_alpha = 1.96;
    let z_beta = (sample_size.max(0) as f64).sqrt() * effect_size.abs() - z_alpha;

    if z_beta <= -3.0 {
        0.001
    } else if z_beta <= -2.0 {
        0.025
    } else if z_beta <= -1.0 {
        0.16
    } else if z_beta <= 0.0 {
        0.5
    } else if z_beta <= 1.0 {
        0.84
    } else if z_beta <= 2.0 {
        0.975
    } else {
        0.999
    }
}

/// Per-arm sample totals, or `None` when either sum overflows `i64`.
fn sample_totals(time_series: &[TimeSeriesPoint]) -> Option<(i64, i64)> {
    time_series.iter().try_fold((0i64, 0i64), |(t, c), p| {
        Some((
            t.checked_add(p.treatment_sample_size)?,
            c.checked_add(p.control_sample_size)?,
        ))
    })
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), AnalyticsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnalyticsError::NonFinite(field))
    }
}
