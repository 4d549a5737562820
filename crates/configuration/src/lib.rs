use crate::error::ConfigError;
use crate::settings::AnalysisSettings;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisSettings as Config, DidOptions, EconomicOptions, LoggingSettings, ReportFormat,
    ReportSettings, StorageSettings,
};

/// Prefix for environment overrides, e.g. `RALLY_DID__MINIMUM_SAMPLE_SIZE=50`.
pub const ENV_PREFIX: &str = "RALLY";

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. The file is optional:
/// without it every setting takes its default. Environment variables prefixed with
/// `RALLY_` override file values (nested keys are separated by `__`).
pub fn load_config() -> Result<AnalysisSettings, ConfigError> {
    build(config::File::with_name("config").required(false))
}

/// Like [`load_config`], but reads the given file, which must exist.
pub fn load_config_from(path: &Path) -> Result<AnalysisSettings, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<AnalysisSettings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `AnalysisSettings` struct
    let settings = builder.try_deserialize::<AnalysisSettings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[did]\nminimum_sample_size = 50\n\n[economics]\nannualization_factor = 250\ninclude_only_significant = true\n"
        )
        .unwrap();

        let settings = load_config_from(file.path()).unwrap();
        assert_eq!(settings.did.minimum_sample_size, 50);
        assert_eq!(settings.did.confidence_level, 95);
        assert_eq!(settings.economics.annualization_factor, dec!(250));
        assert!(settings.economics.include_only_significant);
        assert_eq!(settings.storage, StorageSettings::default());
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[did]\nalpha = 0.0\n").unwrap();

        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
