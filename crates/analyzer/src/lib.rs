//! # Rally Analyzer
//!
//! Runs the Differences-in-Differences estimate over every metric of an experiment and
//! decides which metrics make it into the final results.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Depends on `analytics` for the per-metric math and on
//!   `configuration` for its thresholds. It never touches storage.
//! - **Skip and continue:** A metric that fails validation, fails to compute or lacks
//!   samples becomes an `Excluded` outcome with its reason. It never aborts its
//!   siblings.
//! - **Deterministic:** Metrics are evaluated in parallel, but outcomes come back in
//!   the experiment's metric order, so sums and tie-breaks are reproducible.

use crate::error::AnalyzerError;
use analytics::{DidEstimator, DidResult, interpret_effect_size, is_significant};
use configuration::DidOptions;
use core_types::{ExclusionReason, ExperimentResult, MetricSeries};
use indexmap::IndexMap;
use rayon::prelude::*;

pub mod aggregate;
pub mod error;
pub mod narrative;

pub use aggregate::{AggregateStatistics, StrongestEffect, aggregate};
pub use narrative::narrate;

/// What happened to one metric during the DiD pass.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Included(DidResult),
    Excluded(ExclusionReason),
}

/// Per-metric outcomes of one experiment, in the experiment's metric order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DidAnalysis {
    pub outcomes: IndexMap<String, MetricOutcome>,
}

impl DidAnalysis {
    /// The metrics that survived every check.
    pub fn results(&self) -> IndexMap<String, DidResult> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                MetricOutcome::Included(result) => Some((id.clone(), result.clone())),
                MetricOutcome::Excluded(_) => None,
            })
            .collect()
    }

    pub fn exclusions(&self) -> IndexMap<String, ExclusionReason> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                MetricOutcome::Excluded(reason) => Some((id.clone(), reason.clone())),
                MetricOutcome::Included(_) => None,
            })
            .collect()
    }

    pub fn included_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| matches!(o, MetricOutcome::Included(_)))
            .count()
    }

    /// Emits one event per metric. Kept apart from `evaluate` so the calculation
    /// itself stays free of side effects.
    pub fn log_outcomes(&self, experiment_id: &str, alpha: f64) {
        for (metric_id, outcome) in &self.outcomes {
            match outcome {
                MetricOutcome::Included(r) => tracing::debug!(
                    experiment_id,
                    metric_id = %metric_id,
                    diff = r.absolute_difference,
                    p_value = r.p_value,
                    significant = is_significant(r.p_value, alpha),
                    effect = %interpret_effect_size(r.effect_size),
                    "Metric analyzed."
                ),
                MetricOutcome::Excluded(reason) => tracing::warn!(
                    experiment_id,
                    metric_id = %metric_id,
                    reason = %reason,
                    "Skipping metric."
                ),
            }
        }
        tracing::info!(
            experiment_id,
            analyzed = self.included_count(),
            total = self.outcomes.len(),
            "DiD analysis complete."
        );
    }
}

/// The orchestration layer over `DidEstimator`.
#[derive(Debug, Clone)]
pub struct DidAnalyzer {
    options: DidOptions,
    estimator: DidEstimator,
}

impl DidAnalyzer {
    pub fn new(options: DidOptions) -> Self {
        Self {
            options,
            estimator: DidEstimator::new(),
        }
    }

    pub fn options(&self) -> &DidOptions {
        &self.options
    }

    /// Validates, calculates and gates every metric of the experiment.
    pub fn evaluate(&self, experiment: &ExperimentResult) -> DidAnalysis {
        let entries: Vec<(&String, &MetricSeries)> = experiment.metrics.iter().collect();

        // `collect` on an indexed parallel iterator keeps the input order.
        let evaluated: Vec<(String, MetricOutcome)> = entries
            .par_iter()
            .map(|(metric_id, series)| ((*metric_id).clone(), self.evaluate_metric(series)))
            .collect();

        DidAnalysis {
            outcomes: evaluated.into_iter().collect(),
        }
    }

    /// Like [`DidAnalyzer::evaluate`], but fails when no metric survives.
    pub fn run(&self, experiment: &ExperimentResult) -> Result<DidAnalysis, AnalyzerError> {
        let analysis = self.evaluate(experiment);
        if analysis.included_count() == 0 {
            return Err(AnalyzerError::NoValidMetrics {
                excluded: analysis.exclusions(),
            });
        }
        Ok(analysis)
    }

    fn evaluate_metric(&self, series: &MetricSeries) -> MetricOutcome {
        // 1. Validate
        let report = self.estimator.validate(&series.time_series);
        if !report.is_valid() {
            return MetricOutcome::Excluded(ExclusionReason::DataQuality {
                errors: report.messages(),
            });
        }

        // 2. Calculate
        let result = match self
            .estimator
            .calculate(&series.time_series, self.options.confidence_level)
        {
            Ok(result) => result,
            Err(e) => {
                return MetricOutcome::Excluded(ExclusionReason::Computation {
                    message: e.to_string(),
                });
            }
        };

        // 3. Gate on sample size
        let minimum = self.options.minimum_sample_size;
        if result.sample_size_treatment < minimum || result.sample_size_control < minimum {
            return MetricOutcome::Excluded(ExclusionReason::InsufficientPower {
                treatment: result.sample_size_treatment,
                control: result.sample_size_control,
                minimum,
            });
        }

        MetricOutcome::Included(result)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use analytics::{ConfidenceInterval, DidResult};
    use chrono::{DateTime, Duration, Utc};
    use core_types::{ExperimentPeriod, ExperimentResult, MetricSeries, TimeSeriesPoint};

    pub fn series(values: &[(f64, f64)], samples: i64) -> MetricSeries {
        MetricSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &(treatment_value, control_value))| TimeSeriesPoint {
                    timestamp: DateTime::<Utc>::UNIX_EPOCH + Duration::hours(i as i64),
                    treatment_value,
                    control_value,
                    treatment_sample_size: samples,
                    control_sample_size: samples,
                })
                .collect(),
        )
    }

    pub fn experiment(metrics: Vec<(&str, MetricSeries)>) -> ExperimentResult {
        ExperimentResult {
            experiment_id: "exp-1".to_string(),
            metrics: metrics
                .into_iter()
                .map(|(id, s)| (id.to_string(), s))
                .collect(),
            generated_at: "2025-01-01T00:00:00Z".to_string(),
            experiment_period: ExperimentPeriod {
                start_date: "2025-01-01".to_string(),
                end_date: "2025-01-11".to_string(),
                total_hours: 240,
            },
        }
    }

    /// A hand-built result; only the fields the callers look at matter.
    pub fn result(absolute_difference: f64, p_value: f64, effect_size: f64) -> DidResult {
        DidResult {
            treatment_mean: 1.0 + absolute_difference,
            control_mean: 1.0,
            absolute_difference,
            relative_difference: absolute_difference,
            p_value,
            confidence_level: 95,
            confidence_interval: ConfidenceInterval {
                lower: absolute_difference - 0.1,
                upper: absolute_difference + 0.1,
            },
            sample_size_control: 1000,
            sample_size_treatment: 1000,
            effect_size,
        }
    }
}
