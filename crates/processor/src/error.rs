use core_types::ExclusionReason;
use indexmap::IndexMap;
use thiserror::Error;

/// A stage of the analysis chain failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("DiD analysis failed: {0}")]
    Analyzer(#[from] analyzer::error::AnalyzerError),

    #[error("Economic impact calculation failed: {0}")]
    Economics(#[from] economics::EconomicsError),

    #[error("Insight synthesis failed: {0}")]
    Insights(#[from] insights::InsightError),
}

impl PipelineError {
    /// Per-metric exclusion reasons known at the time of the failure.
    pub fn exclusions(&self) -> IndexMap<String, ExclusionReason> {
        match self {
            PipelineError::Analyzer(analyzer::error::AnalyzerError::NoValidMetrics { excluded }) => {
                excluded.clone()
            }
            _ => IndexMap::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),

    #[error("Analysis task for experiment '{experiment_id}' did not finish: {source}")]
    Task {
        experiment_id: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
