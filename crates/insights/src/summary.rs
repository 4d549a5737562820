use analytics::{DEFAULT_ALPHA, DidResult, is_significant};
use core_types::AnalysisPeriod;
use economics::{EconomicImpact, fixed, with_thousands};
use indexmap::IndexMap;

/// One-paragraph executive summary. The template depends on whether none, all or
/// some of the metrics were significant.
pub fn executive_summary(
    results: &IndexMap<String, DidResult>,
    economic: &EconomicImpact,
    period: &AnalysisPeriod,
) -> String {
    let total = results.len();
    let significant = count_significant(results);
    let direction = economic.direction();
    let daily = fixed(economic.total_impact.abs(), 2);
    let annualized = with_thousands(economic.annualized_impact.abs());
    let days = period.duration_days;

    if significant == 0 {
        format!(
            "Experiment conducted over {} days showed no statistically significant effects across {} measured metrics. Economic impact analysis indicates {} effect of ${} daily, suggesting the tested treatment does not meaningfully improve user experience or business outcomes.",
            days, total, direction, daily
        )
    } else if significant == total {
        format!(
            "Highly successful experiment over {} days achieved statistical significance across all {} measured metrics. {} economic impact of ${} daily (${} annualized) strongly supports implementation of the tested treatment.",
            days,
            total,
            direction.capitalized(),
            daily,
            annualized
        )
    } else {
        format!(
            "Mixed-results experiment over {} days achieved statistical significance in {} of {} measured metrics. {} economic impact of ${} daily (${} annualized) suggests selective implementation may be warranted.",
            days,
            significant,
            total,
            direction.capitalized(),
            daily,
            annualized
        )
    }
}

/// Sample-size and duration caveats that belong with the key findings.
pub fn data_quality_findings(
    results: &IndexMap<String, DidResult>,
    period: &AnalysisPeriod,
) -> Vec<String> {
    let mut findings = Vec::new();

    if !results.is_empty() {
        let n = results.len() as f64;
        let avg_control =
            results.values().map(|r| r.sample_size_control as f64).sum::<f64>() / n;
        let avg_treatment =
            results.values().map(|r| r.sample_size_treatment as f64).sum::<f64>() / n;

        if avg_control < 100.0 || avg_treatment < 100.0 {
            findings.push(format!(
                "Small sample sizes (avg control: {:.0}, treatment: {:.0}) may limit statistical power",
                avg_control.round(),
                avg_treatment.round()
            ));
        } else if avg_control > 1000.0 && avg_treatment > 1000.0 {
            findings.push(format!(
                "Large sample sizes (avg control: {:.0}, treatment: {:.0}) provide high statistical power",
                avg_control.round(),
                avg_treatment.round()
            ));
        }
    }

    if period.duration_days < 7 {
        findings.push(format!(
            "Short experiment duration ({} days) may not capture full user behavior patterns",
            period.duration_days
        ));
    }

    findings
}

pub(crate) fn count_significant(results: &IndexMap<String, DidResult>) -> usize {
    results
        .values()
        .filter(|r| is_significant(r.p_value, DEFAULT_ALPHA))
        .count()
}
