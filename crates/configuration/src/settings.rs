use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing sections fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub did: DidOptions,
    #[serde(default)]
    pub economics: EconomicOptions,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Parameters for the per-metric Differences-in-Differences pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DidOptions {
    /// Confidence level in percent for the per-metric intervals (90, 95 or 99).
    pub confidence_level: u32,
    /// Metrics whose summed treatment or control samples fall below this are dropped.
    pub minimum_sample_size: i64,
    /// Significance threshold used when logging per-metric results.
    pub alpha: f64,
}

/// Parameters for translating statistical effects into dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicOptions {
    /// Days per year used to project the measured daily impact.
    pub annualization_factor: Decimal,
    pub confidence_level: u32,
    /// Only count metrics with p < 0.05 toward the dollar totals.
    pub include_only_significant: bool,
}

/// Where the file-backed store keeps pricing and analysis records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// If set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReportSettings {
    pub format: ReportFormat,
}

/// How the CLI renders an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for DidOptions {
    fn default() -> Self {
        Self {
            confidence_level: 95,
            minimum_sample_size: 10,
            alpha: 0.05,
        }
    }
}

impl Default for EconomicOptions {
    fn default() -> Self {
        Self {
            annualization_factor: dec!(365),
            confidence_level: 95,
            include_only_significant: false,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl AnalysisSettings {
    /// Rejects values that would make the analysis meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.did.validate()?;
        self.economics.validate()?;
        Ok(())
    }
}

impl DidOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_confidence_level("did.confidence_level", self.confidence_level)?;
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "did.alpha must be between 0 and 1 (exclusive), got {}",
                self.alpha
            )));
        }
        if self.minimum_sample_size < 0 {
            return Err(ConfigError::ValidationError(format!(
                "did.minimum_sample_size must not be negative, got {}",
                self.minimum_sample_size
            )));
        }
        Ok(())
    }
}

impl EconomicOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_confidence_level("economics.confidence_level", self.confidence_level)?;
        if self.annualization_factor <= Decimal::ZERO {
            return Err(ConfigError::ValidationError(format!(
                "economics.annualization_factor must be greater than 0, got {}",
                self.annualization_factor
            )));
        }
        Ok(())
    }
}

fn validate_confidence_level(field: &str, level: u32) -> Result<(), ConfigError> {
    if level == 0 || level >= 100 {
        return Err(ConfigError::ValidationError(format!(
            "{} must be a percentage between 1 and 99, got {}",
            field, level
        )));
    }
    if !matches!(level, 90 | 95 | 99) {
        tracing::warn!(
            field,
            level,
            "Confidence level has no exact critical value; 95% will be used for intervals."
        );
    }
    Ok(())
}
