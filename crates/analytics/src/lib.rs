//! # Rally Analytics Engine
//!
//! This crate provides the statistical core of an experiment analysis: descriptive
//! statistics over paired treatment/control series and the Differences-in-Differences
//! estimate built on top of them.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `DidEstimator` is a stateless calculator. It takes
//!   a metric's time series as input and produces a `DidResult` as output.
//! - **Table-driven significance:** p-values and critical values come from small fixed
//!   tables rather than a continuous distribution, so results are easy to explain and
//!   bucket boundaries are stable across releases.
//!
//! ## Public API
//!
//! - `DidEstimator`: validation and per-metric DiD calculation.
//! - `DidResult`: the per-metric statistical record.
//! - `stats`: the numeric primitives (`mean`, `cohens_d`, `approximate_p_value`, ...).
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    DEFAULT_ALPHA, DEFAULT_CONFIDENCE_LEVEL, DidEstimator, MIN_TOTAL_SAMPLES, ValidationIssue,
    ValidationReport, estimate_statistical_power, interpret_effect_size, is_significant,
};
pub use error::AnalyticsError;
pub use report::{ConfidenceInterval, DidResult};
