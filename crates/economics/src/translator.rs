use crate::error::EconomicsError;
use crate::impact::{
    DollarInterval, EconomicImpact, EconomicReport, MetricImpact, SkipReason, SkippedMetric,
};
use analytics::{DEFAULT_ALPHA, DidResult, is_significant};
use configuration::EconomicOptions;
use core_types::MetricValueSnapshots;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;

const ROI_CAP: Decimal = dec!(1000);
const ROI_FLOOR: Decimal = dec!(-100);

/// Converts statistical effects into dollars.
#[derive(Debug, Clone, Default)]
pub struct EconomicTranslator {
    options: EconomicOptions,
}

impl EconomicTranslator {
    pub fn new(options: EconomicOptions) -> Self {
        Self { options }
    }

    /// Computes the dollar impact of the given results.
    ///
    /// # Arguments
    ///
    /// * `results` - Per-metric DiD results, in the order the breakdown should keep.
    /// * `snapshots` - Pricing captured for this analysis. Metrics without one are
    ///   reported as skipped rather than failing the computation.
    /// * `duration_days` - Length of the experiment; must be positive.
    pub fn compute(
        &self,
        results: &IndexMap<String, DidResult>,
        snapshots: &MetricValueSnapshots,
        duration_days: Decimal,
    ) -> Result<EconomicReport, EconomicsError> {
        if duration_days <= Decimal::ZERO {
            return Err(EconomicsError::InvalidDuration(duration_days.to_string()));
        }

        let mut metric_breakdown = IndexMap::new();
        let mut skipped = Vec::new();
        let mut total_impact = Decimal::ZERO;
        let mut lower = Decimal::ZERO;
        let mut upper = Decimal::ZERO;

        for (metric_id, result) in results {
            let Some(snapshot) = snapshots.get(metric_id) else {
                skipped.push(SkippedMetric {
                    metric_id: metric_id.clone(),
                    reason: SkipReason::MissingPricing,
                });
                continue;
            };

            if self.options.include_only_significant
                && !is_significant(result.p_value, DEFAULT_ALPHA)
            {
                skipped.push(SkippedMetric {
                    metric_id: metric_id.clone(),
                    reason: SkipReason::NotSignificant,
                });
                continue;
            }

            let dollars_per_unit = snapshot.dollars_per_unit;
            let change = to_decimal(metric_id, "absolute difference", result.absolute_difference)?;
            let dollar_impact = checked_mul(change, dollars_per_unit, "metric impact")?;

            let ci_lower = to_decimal(metric_id, "interval bound", result.confidence_interval.lower)?;
            let ci_upper = to_decimal(metric_id, "interval bound", result.confidence_interval.upper)?;
            let a = checked_mul(ci_lower, dollars_per_unit, "interval")?;
            let b = checked_mul(ci_upper, dollars_per_unit, "interval")?;
            // A negative price flips the bounds.
            lower = checked_add(lower, a.min(b), "interval")?;
            upper = checked_add(upper, a.max(b), "interval")?;

            total_impact = checked_add(total_impact, dollar_impact, "total impact")?;
            metric_breakdown.insert(
                metric_id.clone(),
                MetricImpact {
                    dollar_impact,
                    metric_value_used: dollars_per_unit,
                    metric_change: result.absolute_difference,
                },
            );
        }

        let factor = self
            .options
            .annualization_factor
            .checked_div(duration_days)
            .ok_or(EconomicsError::Overflow("annualization factor"))?;
        let annualized_impact = checked_mul(total_impact, factor, "annualized impact")?;

        Ok(EconomicReport {
            impact: EconomicImpact {
                total_impact,
                annualized_impact,
                roi_percentage: roi_percentage(total_impact),
                metric_breakdown,
                confidence_interval: DollarInterval { lower, upper },
            },
            skipped,
        })
    }
}

/// `total * 100`, capped at 1000 when positive and floored at -100 when negative.
pub fn roi_percentage(total_impact: Decimal) -> Decimal {
    let scaled = total_impact.saturating_mul(dec!(100));
    if total_impact > Decimal::ZERO {
        scaled.min(ROI_CAP)
    } else if total_impact < Decimal::ZERO {
        scaled.max(ROI_FLOOR)
    } else {
        Decimal::ZERO
    }
}

fn to_decimal(metric_id: &str, field: &'static str, value: f64) -> Result<Decimal, EconomicsError> {
    Decimal::from_f64(value).ok_or_else(|| EconomicsError::NonFiniteValue {
        metric_id: metric_id.to_string(),
        field,
    })
}

fn checked_mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, EconomicsError> {
    a.checked_mul(b).ok_or(EconomicsError::Overflow(what))
}

fn checked_add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, EconomicsError> {
    a.checked_add(b).ok_or(EconomicsError::Overflow(what))
}
