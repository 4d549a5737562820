use crate::impact::EconomicImpact;
use core_types::ImpactDirection;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Plain-language statements about an economic impact.
pub fn narrate(impact: &EconomicImpact, duration_days: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let annualized = impact.annualized_impact;

    match impact.direction() {
        ImpactDirection::Positive => {
            lines.push(format!(
                "Positive economic impact of ${} per day",
                fixed(impact.total_impact, 2)
            ));
            let tier = if annualized > dec!(10000) {
                format!(
                    "Strong annualized value of ${} suggests high-value optimization",
                    with_thousands(annualized)
                )
            } else if annualized > dec!(1000) {
                format!(
                    "Moderate annualized value of ${} justifies implementation",
                    with_thousands(annualized)
                )
            } else {
                format!(
                    "Limited annualized value of ${} may not justify implementation costs",
                    with_thousands(annualized)
                )
            };
            lines.push(tier);
        }
        ImpactDirection::Negative => {
            lines.push(format!(
                "Negative economic impact of ${} per day - treatment reduces value",
                fixed(impact.total_impact.abs(), 2)
            ));
            lines.push(format!(
                "Projected annual loss of ${} suggests avoiding this change",
                with_thousands(annualized.abs())
            ));
        }
        ImpactDirection::Neutral => lines.push(
            "Neutral economic impact - treatment shows no significant financial effect".to_string(),
        ),
    }

    let roi = impact.roi_percentage;
    let roi_line = if roi > dec!(100) {
        format!(
            "Exceptional ROI of {}% indicates highly profitable optimization",
            fixed(roi, 1)
        )
    } else if roi > dec!(20) {
        format!("Strong ROI of {}% exceeds typical business thresholds", fixed(roi, 1))
    } else if roi > Decimal::ZERO {
        format!("Positive ROI of {}% provides business value", fixed(roi, 1))
    } else {
        format!(
            "Negative ROI of {}% suggests treatment reduces business value",
            fixed(roi, 1)
        )
    };
    lines.push(roi_line);

    if let Some((metric_id, driver)) = impact.primary_driver() {
        let direction = if driver.dollar_impact > Decimal::ZERO {
            "positive"
        } else {
            "negative"
        };
        lines.push(format!(
            "Primary value driver: '{}' contributes {} ${} daily impact",
            metric_id,
            direction,
            fixed(driver.dollar_impact.abs(), 2)
        ));
    }

    if duration_days < 7 {
        lines.push(format!(
            "Short experiment duration ({} days) limits confidence in economic projections",
            duration_days
        ));
    } else if duration_days >= 30 {
        lines.push(format!(
            "Extended experiment duration ({} days) provides reliable basis for economic projections",
            duration_days
        ));
    }

    lines
}

/// Rounds half away from zero and always prints `places` decimals.
pub fn fixed(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", places as usize, rounded)
}

/// Groups the integer part in thousands and keeps up to three decimals, dropping
/// trailing zeros (`1234.5` becomes `1,234.5`). Matches en-US locale formatting.
pub fn with_thousands(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
