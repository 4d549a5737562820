//! # Rally Database Crate
//!
//! This crate is the system's "permanent archive". It stores the live metric pricing
//! configuration and every experiment analysis ever produced, as JSON documents under
//! a single data directory.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All storage-specific logic lives here. The rest of the
//!   application talks to `AnalysisRepository` and never touches paths or file formats.
//! - **Keyed Records:** An analysis is addressed by `(experiment_id, analysis_id)`.
//!   Saving the same key twice replaces the record.
//! - **Asynchronous:** All operations are `async` on top of `tokio::fs`, so the
//!   processor can keep several experiments in flight.
//!
//! ## Public API
//!
//! - `connect`: Resolves the data directory (honouring `RALLY_DATA_DIR`) and prepares it.
//! - `initialize_store`: Creates the directory layout for an explicit repository.
//! - `AnalysisRepository`: All high-level data access methods (e.g., `save_experiment_analysis`).
//! - `ExperimentAnalysis`: The persisted analysis record.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod record;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{DATA_DIR_ENV, connect, initialize_store};
pub use error::DbError;
pub use record::{ANALYSIS_SCHEMA_VERSION, ExperimentAnalysis};
pub use repository::{ANALYSES_DIR, AnalysisRepository, METRIC_VALUES_FILE};
