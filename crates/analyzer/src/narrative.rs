use crate::aggregate::aggregate;
use analytics::{DEFAULT_ALPHA, DidResult, interpret_effect_size, is_significant};
use core_types::AnalysisPeriod;
use indexmap::IndexMap;

/// Plain-language statements about a set of DiD results.
///
/// Order: overall significance, average effect size, strongest effect, duration
/// caveat, then one line per significant metric.
pub fn narrate(results: &IndexMap<String, DidResult>, period: &AnalysisPeriod) -> Vec<String> {
    let mut lines = Vec::new();
    let stats = aggregate(results);

    if stats.overall_significance {
        lines.push(format!(
            "Experiment shows statistically significant results in {} out of {} metrics",
            stats.significant_metrics, stats.total_metrics
        ));
    } else {
        lines.push(format!(
            "Experiment did not achieve statistical significance in any of the {} measured metrics",
            stats.total_metrics
        ));
    }

    let avg = stats.average_effect_size;
    let effect_line = if avg > 0.8 {
        format!("Large average effect size ({:.2}) indicates strong treatment impact", avg)
    } else if avg > 0.5 {
        format!("Medium average effect size ({:.2}) indicates moderate treatment impact", avg)
    } else if avg > 0.2 {
        format!("Small average effect size ({:.2}) indicates minimal treatment impact", avg)
    } else {
        format!(
            "Negligible average effect size ({:.2}) indicates little to no treatment impact",
            avg
        )
    };
    lines.push(effect_line);

    if let Some(strongest) = &stats.strongest_effect {
        lines.push(format!(
            "Strongest effect observed in metric '{}' with {} effect size ({:.2})",
            strongest.metric_id,
            interpret_effect_size(strongest.effect_size),
            strongest.effect_size
        ));
    }

    let days = period.duration_days;
    if days < 7 {
        lines.push(format!(
            "Short experiment duration ({} days) may limit reliability of results",
            days
        ));
    } else if days > 30 {
        lines.push(format!(
            "Extended experiment duration ({} days) provides robust data for analysis",
            days
        ));
    }

    for (metric_id, result) in results {
        if is_significant(result.p_value, DEFAULT_ALPHA) {
            let direction = if result.absolute_difference > 0.0 {
                "positive"
            } else {
                "negative"
            };
            lines.push(format!(
                "Metric '{}' shows {} {:.1}% change with {}% confidence",
                metric_id,
                direction,
                (result.relative_difference * 100.0).abs(),
                result.confidence_level
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::result;

    fn period(duration_days: u32) -> AnalysisPeriod {
        AnalysisPeriod {
            start_date: "2025-01-01".to_string(),
            end_date: "2025-02-01".to_string(),
            duration_days,
        }
    }

    #[test]
    fn narrates_in_fixed_order() {
        let results: IndexMap<String, DidResult> = [
            ("conversion".to_string(), result(0.25, 0.01, 1.2)),
            ("bounce".to_string(), result(-0.05, 0.5, -0.1)),
        ]
        .into_iter()
        .collect();

        let lines = narrate(&results, &period(45));
        assert_eq!(
            lines,
            vec![
                "Experiment shows statistically significant results in 1 out of 2 metrics",
                "Medium average effect size (0.65) indicates moderate treatment impact",
                "Strongest effect observed in metric 'conversion' with large effect size (1.20)",
                "Extended experiment duration (45 days) provides robust data for analysis",
                "Metric 'conversion' shows positive 25.0% change with 95% confidence",
            ]
        );
    }

    #[test]
    fn no_significance_and_short_duration() {
        let results: IndexMap<String, DidResult> =
            [("m".to_string(), result(-0.02, 0.2, -0.1))].into_iter().collect();

        let lines = narrate(&results, &period(3));
        assert_eq!(
            lines[0],
            "Experiment did not achieve statistical significance in any of the 1 measured metrics"
        );
        assert_eq!(
            lines[1],
            "Negligible average effect size (0.10) indicates little to no treatment impact"
        );
        assert_eq!(
            lines[3],
            "Short experiment duration (3 days) may limit reliability of results"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn significant_decrease_reads_negative() {
        let results: IndexMap<String, DidResult> =
            [("churn".to_string(), result(-0.125, 0.05 - 1e-9, -0.6))].into_iter().collect();

        let lines = narrate(&results, &period(14));
        assert_eq!(
            lines.last().unwrap(),
            "Metric 'churn' shows negative 12.5% change with 95% confidence"
        );
        // No duration line between 7 and 30 days.
        assert_eq!(lines.len(), 4);
    }
}
