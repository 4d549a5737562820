use crate::summary::count_significant;
use analytics::DidResult;
use core_types::{AnalysisPeriod, Complexity};
use economics::{ComplexityEstimate, EconomicImpact};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// What to do next, given the results and their dollar value.
pub fn recommendations(
    results: &IndexMap<String, DidResult>,
    economic: &EconomicImpact,
    complexity: &ComplexityEstimate,
    period: &AnalysisPeriod,
) -> Vec<String> {
    let mut recs: Vec<String> = Vec::new();

    if count_significant(results) == 0 {
        recs.push("Do not implement the tested treatment - no significant improvements detected".into());
        recs.push("Consider testing alternative approaches or increasing sample size for future experiments".into());
        recs.push("Analyze user feedback to identify potential improvements not captured by current metrics".into());
    } else if economic.total_impact > Decimal::ZERO {
        recs.push("Implement the tested treatment - positive economic impact justifies rollout".into());
        if economic.roi_percentage > dec!(50) {
            recs.push("Prioritize immediate implementation due to high ROI potential".into());
        } else {
            recs.push("Plan gradual rollout to monitor real-world performance".into());
        }
        recs.extend(complexity.recommendations.iter().cloned());
    } else {
        recs.push("Exercise caution - mixed or negative economic impact requires careful consideration".into());
        recs.push("Consider implementing only the components affecting significantly positive metrics".into());
        recs.push("Conduct cost-benefit analysis including implementation and maintenance costs".into());
    }

    if period.duration_days < 14 {
        recs.push("Consider running extended validation experiment before full implementation".into());
    }

    recs
}

/// Each condition contributes at most one risk.
pub fn risk_factors(
    results: &IndexMap<String, DidResult>,
    economic: &EconomicImpact,
    period: &AnalysisPeriod,
) -> Vec<String> {
    let mut risks = Vec::new();

    let borderline = results
        .values()
        .filter(|r| r.p_value > 0.1 && r.p_value < 0.2)
        .count();
    if borderline > 0 {
        risks.push(format!(
            "Borderline significance in {} metrics may indicate unstable effects",
            borderline
        ));
    }

    if economic.total_impact < Decimal::ZERO {
        risks.push("Negative economic impact could result in revenue loss if implemented".to_string());
    }

    if results.len() > 5 {
        risks.push(
            "Multiple metrics affected increases implementation complexity and failure risk"
                .to_string(),
        );
    }

    if period.duration_days < 7 {
        risks.push("Short experiment period may not capture seasonal or cyclical effects".to_string());
    }

    let small_samples = results
        .values()
        .filter(|r| r.sample_size_control < 30 || r.sample_size_treatment < 30)
        .count();
    if small_samples > 0 {
        risks.push(format!(
            "Small sample sizes in {} metrics may produce unreliable results",
            small_samples
        ));
    }

    risks
}

pub fn success_factors(
    results: &IndexMap<String, DidResult>,
    economic: &EconomicImpact,
) -> Vec<String> {
    let mut factors = Vec::new();

    if economic.total_impact > Decimal::ZERO {
        factors.push(
            "Monitor economic metrics closely during rollout to validate projected impact"
                .to_string(),
        );
    }

    let strong: Vec<&str> = results
        .iter()
        .filter(|(_, r)| r.effect_size.abs() > 0.8)
        .map(|(id, _)| id.as_str())
        .collect();
    if !strong.is_empty() {
        factors.push(format!(
            "Focus on metrics with strong effects: {}",
            strong.join(", ")
        ));
    }

    factors.push("Establish baseline measurements before implementation".to_string());
    factors.push("Plan rollback strategy in case of unexpected negative effects".to_string());
    factors
}

/// Calendar estimate: base weeks for the tier plus one week per two significant
/// metrics.
pub fn estimate_effort(complexity: Complexity, significant_metrics: usize) -> &'static str {
    let weeks = complexity.base_weeks() as usize + significant_metrics / 2;
    if weeks <= 1 {
        "1-2 weeks"
    } else if weeks <= 4 {
        "2-4 weeks"
    } else if weeks <= 8 {
        "1-2 months"
    } else {
        "2+ months"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{impact, period, result};
    use economics::estimate_implementation_complexity;

    fn map(entries: Vec<(&str, DidResult)>) -> IndexMap<String, DidResult> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn no_significance_recommends_against() {
        let rs = map(vec![("a", result(0.1, 0.5, 500, 0.1))]);
        let recs = recommendations(
            &rs,
            &impact(dec!(1), dec!(36.5)),
            &estimate_implementation_complexity(&rs),
            &period(20),
        );
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Do not implement"));
    }

    #[test]
    fn positive_impact_recommends_rollout_with_tier_advice() {
        let rs = map(vec![
            ("a", result(0.1, 0.01, 500, 0.9)),
            ("b", result(0.1, 0.01, 500, 0.9)),
        ]);
        let complexity = estimate_implementation_complexity(&rs);

        let high_roi = recommendations(&rs, &impact(dec!(1.5), dec!(54.75)), &complexity, &period(10));
        assert_eq!(
            high_roi,
            vec![
                "Implement the tested treatment - positive economic impact justifies rollout",
                "Prioritize immediate implementation due to high ROI potential",
                "Implement changes gradually to monitor individual metric impacts",
                "Consider A/B testing individual components",
                "Consider running extended validation experiment before full implementation",
            ]
        );

        let low_roi = recommendations(&rs, &impact(dec!(0.5), dec!(18.25)), &complexity, &period(14));
        assert_eq!(low_roi[1], "Plan gradual rollout to monitor real-world performance");
        assert_eq!(low_roi.len(), 4);
    }

    #[test]
    fn negative_impact_is_cautionary() {
        let rs = map(vec![("a", result(-0.1, 0.01, 500, -0.9))]);
        let recs = recommendations(
            &rs,
            &impact(dec!(-2), dec!(-73)),
            &estimate_implementation_complexity(&rs),
            &period(30),
        );
        assert_eq!(recs.len(), 3);
        assert!(recs[0].starts_with("Exercise caution"));
    }

    #[test]
    fn every_risk_fires_once() {
        let rs = map(vec![
            ("a", result(0.1, 0.15, 20, 0.1)),
            ("b", result(0.1, 0.15, 20, 0.1)),
            ("c", result(0.1, 0.5, 500, 0.1)),
            ("d", result(0.1, 0.5, 500, 0.1)),
            ("e", result(0.1, 0.5, 500, 0.1)),
            ("f", result(0.1, 0.5, 500, 0.1)),
        ]);
        let risks = risk_factors(&rs, &impact(dec!(-1), dec!(-365)), &period(3));
        assert_eq!(
            risks,
            vec![
                "Borderline significance in 2 metrics may indicate unstable effects",
                "Negative economic impact could result in revenue loss if implemented",
                "Multiple metrics affected increases implementation complexity and failure risk",
                "Short experiment period may not capture seasonal or cyclical effects",
                "Small sample sizes in 2 metrics may produce unreliable results",
            ]
        );
    }

    #[test]
    fn clean_experiment_has_no_risks() {
        let rs = map(vec![("a", result(0.1, 0.01, 500, 0.9))]);
        // p = 0.1 and p = 0.2 are outside the open borderline interval.
        let edges = map(vec![
            ("a", result(0.1, 0.1, 500, 0.1)),
            ("b", result(0.1, 0.2, 500, 0.1)),
        ]);
        assert!(risk_factors(&rs, &impact(dec!(1), dec!(36.5)), &period(14)).is_empty());
        assert!(risk_factors(&edges, &impact(dec!(1), dec!(36.5)), &period(14)).is_empty());
    }

    #[test]
    fn success_factors_list_strong_metrics() {
        let rs = map(vec![
            ("conversion", result(0.1, 0.01, 500, 0.9)),
            ("bounce", result(0.1, 0.01, 500, 0.2)),
            ("revenue", result(0.1, 0.01, 500, -1.1)),
        ]);
        let factors = success_factors(&rs, &impact(dec!(1), dec!(36.5)));
        assert_eq!(
            factors,
            vec![
                "Monitor economic metrics closely during rollout to validate projected impact",
                "Focus on metrics with strong effects: conversion, revenue",
                "Establish baseline measurements before implementation",
                "Plan rollback strategy in case of unexpected negative effects",
            ]
        );
        assert_eq!(success_factors(&rs, &impact(dec!(-1), dec!(-36.5))).len(), 3);
    }

    #[test]
    fn effort_buckets() {
        assert_eq!(estimate_effort(Complexity::Low, 0), "1-2 weeks");
        assert_eq!(estimate_effort(Complexity::Low, 1), "1-2 weeks");
        assert_eq!(estimate_effort(Complexity::Low, 2), "2-4 weeks");
        assert_eq!(estimate_effort(Complexity::Medium, 3), "2-4 weeks");
        assert_eq!(estimate_effort(Complexity::Medium, 4), "1-2 months");
        assert_eq!(estimate_effort(Complexity::High, 4), "1-2 months");
        assert_eq!(estimate_effort(Complexity::High, 6), "2+ months");
    }
}
