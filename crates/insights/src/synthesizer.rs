use crate::confidence::score_confidence;
use crate::error::InsightError;
use crate::guidance::{estimate_effort, recommendations, risk_factors, success_factors};
use crate::report::{ImplementationGuidance, InsightAnalysis};
use crate::summary::{count_significant, data_quality_findings, executive_summary};
use analytics::DidResult;
use core_types::{AnalysisPeriod, MetricValueSnapshots};
use economics::{EconomicImpact, estimate_implementation_complexity};
use indexmap::IndexMap;

/// Composes the statistical and economic outputs into one recommendation report.
#[derive(Debug, Default, Clone, Copy)]
pub struct InsightSynthesizer {}

impl InsightSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the full insight report.
    ///
    /// `_snapshots` is the pricing the economic figures were derived from. The
    /// report text does not quote unit prices today, so it is accepted but unread.
    pub fn synthesize(
        &self,
        results: &IndexMap<String, DidResult>,
        economic: &EconomicImpact,
        period: &AnalysisPeriod,
        _snapshots: &MetricValueSnapshots,
    ) -> Result<InsightAnalysis, InsightError> {
        if results.is_empty() {
            return Err(InsightError::NoResults);
        }

        let complexity = estimate_implementation_complexity(results);
        let significant = count_significant(results);

        let mut key_findings: Vec<String> = analyzer::narrate(results, period)
            .into_iter()
            .take(3)
            .collect();
        key_findings.extend(
            economics::narrate(economic, period.duration_days)
                .into_iter()
                .take(2),
        );
        key_findings.extend(data_quality_findings(results, period));

        let mut critical_success_factors = complexity.recommendations.clone();
        critical_success_factors.extend(success_factors(results, economic));

        Ok(InsightAnalysis {
            summary: executive_summary(results, economic, period),
            key_findings,
            recommendations: recommendations(results, economic, &complexity, period),
            risk_factors: risk_factors(results, economic, period),
            implementation_guidance: ImplementationGuidance {
                complexity: complexity.complexity,
                estimated_effort: estimate_effort(complexity.complexity, significant).to_string(),
                critical_success_factors,
            },
            confidence: score_confidence(results, period.duration_days).assessment(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{impact, period, result};
    use core_types::{Complexity, ConfidenceLevel};
    use rust_decimal_macros::dec;

    #[test]
    fn empty_results_are_rejected() {
        let err = InsightSynthesizer::new()
            .synthesize(
                &IndexMap::new(),
                &impact(dec!(0), dec!(0)),
                &period(10),
                &MetricValueSnapshots::new(),
            )
            .unwrap_err();
        assert_eq!(err, InsightError::NoResults);
    }

    #[test]
    fn assembles_every_section() {
        let results: IndexMap<String, DidResult> = [
            ("conversion".to_string(), result(0.02, 0.01, 600, 0.9)),
            ("bounce".to_string(), result(-0.01, 0.01, 600, -0.7)),
        ]
        .into_iter()
        .collect();
        let economic = impact(dec!(1.5), dec!(54.75));

        let insights = InsightSynthesizer::new()
            .synthesize(&results, &economic, &period(20), &MetricValueSnapshots::new())
            .unwrap();

        assert!(insights.summary.starts_with("Highly successful experiment over 20 days"));
        // 3 DiD lines + 2 economic lines, no data-quality caveats.
        assert_eq!(insights.key_findings.len(), 5);
        assert_eq!(
            insights.key_findings[3],
            "Positive economic impact of $1.50 per day"
        );
        assert_eq!(
            insights.recommendations[1],
            "Prioritize immediate implementation due to high ROI potential"
        );
        assert!(insights.risk_factors.is_empty());

        let guidance = &insights.implementation_guidance;
        assert_eq!(guidance.complexity, Complexity::Medium);
        assert_eq!(guidance.estimated_effort, "2-4 weeks");
        assert_eq!(guidance.critical_success_factors.len(), 2 + 4);

        assert_eq!(insights.confidence.level, ConfidenceLevel::High);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let results: IndexMap<String, DidResult> =
            [("m".to_string(), result(0.1, 0.2, 40, 0.3))].into_iter().collect();
        let economic = impact(dec!(-0.4), dec!(-14.6));
        let s = InsightSynthesizer::new();
        let snapshots = MetricValueSnapshots::new();

        assert_eq!(
            s.synthesize(&results, &economic, &period(5), &snapshots),
            s.synthesize(&results, &economic, &period(5), &snapshots)
        );
    }
}
