#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use core_types::{
    ExperimentPeriod, ExperimentResult, MetricCategory, MetricSeries, MetricValue,
    TimeSeriesPoint,
};
use rust_decimal::Decimal;

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

/// Treatment around 0.06, control around 0.05, 1000 samples per arm per point.
pub fn conversion_lift() -> MetricSeries {
    series(
        &[
            (0.058, 0.049),
            (0.060, 0.050),
            (0.062, 0.051),
            (0.059, 0.050),
            (0.061, 0.050),
        ],
        1000,
    )
}

pub fn experiment(id: &str, metrics: Vec<(&str, MetricSeries)>, total_hours: u32) -> ExperimentResult {
    ExperimentResult {
        experiment_id: id.to_string(),
        metrics: metrics
            .into_iter()
            .map(|(metric_id, s)| (metric_id.to_string(), s))
            .collect(),
        generated_at: "2025-01-11T00:00:00Z".to_string(),
        experiment_period: ExperimentPeriod {
            start_date: "2025-01-01".to_string(),
            end_date: "2025-01-11".to_string(),
            total_hours,
        },
    }
}

pub fn metric_value(id: &str, dollars_per_unit: Decimal) -> MetricValue {
    MetricValue {
        metric_id: id.to_string(),
        dollars_per_unit,
        unit: "conversion".to_string(),
        name: id.to_string(),
        description: format!("Value of one {}", id),
        category: MetricCategory::Conversion,
        last_updated: Utc::now(),
        updated_by: Some("tests".to_string()),
        version: 0,
        validation_rules: None,
    }
}
