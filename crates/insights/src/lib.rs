//! # Rally Insights
//!
//! Turns the statistical results and their dollar value into a report a product
//! owner can act on: an executive summary, key findings, recommendations, risks,
//! implementation guidance and a confidence rating.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Logic:** Depends on `analyzer` and `economics` for their narratives
//!   and on nothing that performs I/O.
//! - **Built once:** An `InsightAnalysis` is assembled in a single pass and never
//!   mutated afterwards.
//!
//! ## Public API
//!
//! - `InsightSynthesizer`: produces an `InsightAnalysis`.
//! - `confidence`: the additive confidence score and its breakdown.
//! - `InsightError`: the specific error types that can be returned from this crate.

pub mod confidence;
pub mod error;
pub mod guidance;
pub mod report;
pub mod summary;
pub mod synthesizer;

pub use confidence::{ConfidenceScore, score_confidence};
pub use error::InsightError;
pub use guidance::estimate_effort;
pub use report::{ConfidenceAssessment, ImplementationGuidance, InsightAnalysis};
pub use synthesizer::InsightSynthesizer;

#[cfg(test)]
pub(crate) mod test_support {
    use analytics::{ConfidenceInterval, DidResult};
    use core_types::AnalysisPeriod;
    use economics::{DollarInterval, EconomicImpact, roi_percentage};
    use indexmap::IndexMap;
    use rust_decimal::Decimal;

    pub fn result(absolute_difference: f64, p_value: f64, samples: i64, effect_size: f64) -> DidResult {
        DidResult {
            treatment_mean: 1.0 + absolute_difference,
            control_mean: 1.0,
            absolute_difference,
            relative_difference: absolute_difference,
            p_value,
            confidence_level: 95,
            confidence_interval: ConfidenceInterval {
                lower: absolute_difference - 0.05,
                upper: absolute_difference + 0.05,
            },
            sample_size_control: samples,
            sample_size_treatment: samples,
            effect_size,
        }
    }

    pub fn impact(total: Decimal, annualized: Decimal) -> EconomicImpact {
        EconomicImpact {
            total_impact: total,
            annualized_impact: annualized,
            roi_percentage: roi_percentage(total),
            metric_breakdown: IndexMap::new(),
            confidence_interval: DollarInterval {
                lower: Decimal::ZERO,
                upper: Decimal::ZERO,
            },
        }
    }

    pub fn period(duration_days: u32) -> AnalysisPeriod {
        AnalysisPeriod {
            start_date: "2025-03-01".to_string(),
            end_date: "2025-03-31".to_string(),
            duration_days,
        }
    }
}
