use analytics::DidResult;
use chrono::{DateTime, Utc};
use core_types::{
    AnalysisPeriod, AnalysisStatus, ExclusionReason, ExperimentResult, MetricValueSnapshots,
};
use economics::{EconomicImpact, SkippedMetric};
use indexmap::IndexMap;
use insights::InsightAnalysis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Schema version written on every new record.
pub const ANALYSIS_SCHEMA_VERSION: &str = "1.0.0";

/// One persisted analysis of one experiment result.
///
/// Records start as `processing`, then become `complete` with every stage output
/// filled in, or `failed` with `error` set and whatever was known at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentAnalysis {
    pub experiment_id: String,
    pub analysis_id: Uuid,
    /// `generated_at` of the source experiment result.
    pub generated_at: String,
    pub did_results: IndexMap<String, DidResult>,
    pub economic_impact: Option<EconomicImpact>,
    pub metric_values_snapshot: MetricValueSnapshots,
    pub insights: Option<InsightAnalysis>,
    #[serde(default)]
    pub excluded_metrics: IndexMap<String, ExclusionReason>,
    #[serde(default)]
    pub unpriced_metrics: Vec<SkippedMetric>,
    pub analysis_timestamp: DateTime<Utc>,
    pub experiment_period: AnalysisPeriod,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: String,
}

impl ExperimentAnalysis {
    /// A fresh `processing` record for the given experiment result.
    pub fn processing(experiment: &ExperimentResult, analysis_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            experiment_id: experiment.experiment_id.clone(),
            analysis_id,
            generated_at: experiment.generated_at.clone(),
            did_results: IndexMap::new(),
            economic_impact: None,
            metric_values_snapshot: MetricValueSnapshots::new(),
            insights: None,
            excluded_metrics: IndexMap::new(),
            unpriced_metrics: Vec::new(),
            analysis_timestamp: now,
            experiment_period: AnalysisPeriod::from(&experiment.experiment_period),
            status: AnalysisStatus::Processing,
            error: None,
            updated_at: None,
            version: ANALYSIS_SCHEMA_VERSION.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == AnalysisStatus::Complete
    }
}
