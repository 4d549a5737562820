use core_types::ExclusionReason;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// Every metric was excluded. The reasons are kept so a failed run can still
    /// report why.
    #[error("No metrics could be analyzed ({} excluded)", excluded.len())]
    NoValidMetrics {
        excluded: IndexMap<String, ExclusionReason>,
    },
}
