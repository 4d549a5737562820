//! # Rally Economics
//!
//! Translates per-metric treatment effects into dollars using the pricing captured
//! for an analysis, and rates how hard the change would be to roll out.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Consumes `DidResult` records and pricing snapshots; knows
//!   nothing about how either was produced or stored.
//! - **Exact money:** Dollar amounts are `rust_decimal::Decimal`. Statistical inputs
//!   are converted once, at the boundary of the calculation.
//! - **Missing pricing is not fatal:** A metric without a snapshot is reported in
//!   `EconomicReport::skipped` and the rest are still priced.
//!
//! ## Public API
//!
//! - `EconomicTranslator`: computes the `EconomicImpact` of a set of results.
//! - `estimate_implementation_complexity`: rollout complexity from significant metrics.
//! - `narrate`: plain-language statements about an impact.
//! - `EconomicsError`: the specific error types that can be returned from this crate.

pub mod complexity;
pub mod error;
pub mod impact;
pub mod narrative;
pub mod translator;

pub use complexity::{ComplexityEstimate, estimate_implementation_complexity};
pub use error::EconomicsError;
pub use impact::{
    DollarInterval, EconomicImpact, EconomicReport, MetricImpact, SkipReason, SkippedMetric,
};
pub use narrative::{fixed, narrate, with_thousands};
pub use translator::{EconomicTranslator, roi_percentage};
