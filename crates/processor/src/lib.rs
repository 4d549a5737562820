//! # Rally Processor
//!
//! The master orchestrator. It composes the analysis crates into one pipeline and
//! wraps that pipeline in the boundary service that reads pricing from, and writes
//! analyses to, the store.
//!
//! ## Architectural Principles
//!
//! - **Pure core, effectful shell:** `pipeline` is synchronous and deterministic.
//!   `AnalysisProcessor` owns every side effect: ids, clocks, storage and logging of
//!   the run lifecycle.
//! - **Nothing is lost on failure:** A failed run is persisted with status `failed`,
//!   its error and the exclusion reasons known at the time.
//!
//! ## Public API
//!
//! - `AnalysisPipeline` and the stage functions `run_did_analysis`,
//!   `compute_economic_impact` and `synthesize_insights`.
//! - `AnalysisProcessor`: skip, snapshot, run and persist for one experiment result.
//! - `PipelineError`, `ProcessorError`: the specific error types of this crate.

pub mod error;
pub mod pipeline;
pub mod processor;

pub use error::{PipelineError, ProcessorError};
pub use pipeline::{
    AnalysisOutput, AnalysisPipeline, compute_economic_impact, run_did_analysis,
    synthesize_insights,
};
pub use processor::{AnalysisProcessor, ProcessOutcome, SkipCause};
