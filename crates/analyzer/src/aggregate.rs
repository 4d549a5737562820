use analytics::{DEFAULT_ALPHA, DidResult, is_significant};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The metric with the largest absolute effect size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongestEffect {
    pub metric_id: String,
    /// Signed Cohen's d of that metric.
    pub effect_size: f64,
}

/// Roll-up of the included metrics of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatistics {
    pub total_metrics: usize,
    pub significant_metrics: usize,
    /// Mean of `|effect_size|`.
    pub average_effect_size: f64,
    pub strongest_effect: Option<StrongestEffect>,
    pub overall_significance: bool,
}

/// Summarizes a set of per-metric results.
///
/// Significance uses `p < 0.05`. Ties for the strongest effect keep the metric seen
/// first.
pub fn aggregate(results: &IndexMap<String, DidResult>) -> AggregateStatistics {
    if results.is_empty() {
        return AggregateStatistics {
            total_metrics: 0,
            significant_metrics: 0,
            average_effect_size: 0.0,
            strongest_effect: None,
            overall_significance: false,
        };
    }

    let mut significant_metrics = 0;
    let mut total_effect_size = 0.0;
    let mut strongest_effect: Option<StrongestEffect> = None;

    for (metric_id, result) in results {
        if is_significant(result.p_value, DEFAULT_ALPHA) {
            significant_metrics += 1;
        }
        total_effect_size += result.effect_size.abs();

        let stronger = strongest_effect
            .as_ref()
            .is_none_or(|s| result.effect_size.abs() > s.effect_size.abs());
        if stronger {
            strongest_effect = Some(StrongestEffect {
                metric_id: metric_id.clone(),
                effect_size: result.effect_size,
            });
        }
    }

    AggregateStatistics {
        total_metrics: results.len(),
        significant_metrics,
        average_effect_size: total_effect_size / results.len() as f64,
        strongest_effect,
        overall_significance: significant_metrics > 0,
    }
}
