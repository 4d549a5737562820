use core_types::ImpactDirection;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dollar contribution of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricImpact {
    /// Daily dollar impact: `metric_change * metric_value_used`.
    pub dollar_impact: Decimal,
    /// The `dollars_per_unit` taken from the pricing snapshot.
    pub metric_value_used: Decimal,
    /// The DiD absolute difference, in metric units.
    pub metric_change: f64,
}

/// A dollar range with `lower <= upper`, whatever the sign of the prices behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DollarInterval {
    pub lower: Decimal,
    pub upper: Decimal,
}

/// The business value of an experiment, derived from its DiD results and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicImpact {
    /// Sum of the per-metric daily impacts.
    pub total_impact: Decimal,
    pub annualized_impact: Decimal,
    /// Heuristic proxy bounded to [-100, 1000]; not a cost-adjusted ROI.
    pub roi_percentage: Decimal,
    pub metric_breakdown: IndexMap<String, MetricImpact>,
    /// Sum of the per-metric interval bounds in dollars. Ignores covariance.
    pub confidence_interval: DollarInterval,
}

impl EconomicImpact {
    pub fn direction(&self) -> ImpactDirection {
        if self.total_impact > Decimal::ZERO {
            ImpactDirection::Positive
        } else if self.total_impact < Decimal::ZERO {
            ImpactDirection::Negative
        } else {
            ImpactDirection::Neutral
        }
    }

    /// The metric with the largest absolute dollar impact. Ties keep the first.
    pub fn primary_driver(&self) -> Option<(&String, &MetricImpact)> {
        let mut best: Option<(&String, &MetricImpact)> = None;
        for (id, m) in &self.metric_breakdown {
            if best.is_none_or(|(_, b)| m.dollar_impact.abs() > b.dollar_impact.abs()) {
                best = Some((id, m));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No pricing snapshot exists for the metric.
    MissingPricing,
    /// Left out because only significant metrics were requested.
    NotSignificant,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingPricing => f.write_str("no metric value configured"),
            SkipReason::NotSignificant => f.write_str("not statistically significant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedMetric {
    pub metric_id: String,
    pub reason: SkipReason,
}

/// Output of [`crate::EconomicTranslator::compute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicReport {
    pub impact: EconomicImpact,
    pub skipped: Vec<SkippedMetric>,
}

impl EconomicReport {
    pub fn log_summary(&self, experiment_id: &str) {
        for skipped in &self.skipped {
            tracing::warn!(
                experiment_id,
                metric_id = %skipped.metric_id,
                reason = %skipped.reason,
                "Metric left out of economic impact."
            );
        }
        for (metric_id, m) in &self.impact.metric_breakdown {
            tracing::debug!(
                experiment_id,
                metric_id = %metric_id,
                change = m.metric_change,
                value = %m.metric_value_used,
                daily_impact = %m.dollar_impact.round_dp(2),
                "Metric priced."
            );
        }
        tracing::info!(
            experiment_id,
            total = %self.impact.total_impact.round_dp(2),
            annualized = %self.impact.annualized_impact.round_dp(2),
            roi = %self.impact.roi_percentage.round_dp(1),
            "Economic impact calculation complete."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn metric(dollar_impact: Decimal) -> MetricImpact {
        MetricImpact {
            dollar_impact,
            metric_value_used: dec!(10),
            metric_change: 0.1,
        }
    }

    fn impact(entries: &[(&str, Decimal)]) -> EconomicImpact {
        let metric_breakdown: IndexMap<String, MetricImpact> = entries
            .iter()
            .map(|(id, d)| (id.to_string(), metric(*d)))
            .collect();
        let total_impact = metric_breakdown.values().map(|m| m.dollar_impact).sum();
        EconomicImpact {
            total_impact,
            annualized_impact: total_impact,
            roi_percentage: Decimal::ZERO,
            metric_breakdown,
            confidence_interval: DollarInterval {
                lower: Decimal::ZERO,
                upper: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn primary_driver_uses_absolute_value_and_keeps_first_on_tie() {
        let i = impact(&[("a", dec!(1)), ("b", dec!(-3)), ("c", dec!(3))]);
        assert_eq!(i.primary_driver().map(|(id, _)| id.as_str()), Some("b"));
        assert_eq!(i.direction(), ImpactDirection::Positive);
        assert_eq!(impact(&[]).primary_driver(), None);
        assert_eq!(impact(&[]).direction(), ImpactDirection::Neutral);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(impact(&[("a", dec!(-1.25))])).unwrap();
        assert_eq!(json["totalImpact"], "-1.25");
        assert_eq!(json["metricBreakdown"]["a"]["metricValueUsed"], "10");
        assert_eq!(json["confidenceInterval"]["lower"], "0");
    }
}
