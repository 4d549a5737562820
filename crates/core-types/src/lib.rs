//! # Rally Core Types
//!
//! The shared vocabulary of the analysis workspace: the experiment results that arrive
//! from upstream, the pricing configuration used to put a dollar value on a metric,
//! and the reasons a metric can be left out of an analysis.
//!
//! As a Layer 0 crate it depends on no other workspace crate.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AnalysisStatus, Complexity, ConfidenceLevel, EffectMagnitude, ImpactDirection,
    MetricCategory,
};
pub use error::CoreError;
pub use structs::{
    AnalysisPeriod, ExclusionReason, ExperimentPeriod, ExperimentResult, MetricSeries,
    MetricSummary, MetricValue, MetricValueSnapshot, MetricValueSnapshots, TimeSeriesPoint,
    ValidationRules,
};
