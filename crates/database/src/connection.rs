use crate::error::DbError;
use crate::repository::{ANALYSES_DIR, AnalysisRepository, METRIC_VALUES_FILE};
use dotenvy::dotenv;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured data directory.
pub const DATA_DIR_ENV: &str = "RALLY_DATA_DIR";

/// Opens the file-backed store.
///
/// This function loads `.env` if one exists, lets `RALLY_DATA_DIR` override the
/// configured directory, and makes sure the directory layout is in place.
pub async fn connect(configured_dir: &Path) -> Result<AnalysisRepository, DbError> {
    // A missing .env file is normal outside development.
    dotenv().ok();

    let data_dir = match env::var(DATA_DIR_ENV) {
        Ok(dir) if dir.trim().is_empty() => {
            return Err(DbError::ConnectionConfigError(format!(
                "{} is set but empty.",
                DATA_DIR_ENV
            )));
        }
        Ok(dir) => PathBuf::from(dir),
        Err(_) => configured_dir.to_path_buf(),
    };

    let repo = AnalysisRepository::new(data_dir);
    initialize_store(&repo).await?;
    Ok(repo)
}

/// Creates the directory layout and an empty pricing file if they are missing.
pub async fn initialize_store(repo: &AnalysisRepository) -> Result<(), DbError> {
    let analyses = repo.root().join(ANALYSES_DIR);
    tokio::fs::create_dir_all(&analyses)
        .await
        .map_err(|e| DbError::io(&analyses, e))?;

    let pricing = repo.root().join(METRIC_VALUES_FILE);
    if !tokio::fs::try_exists(&pricing)
        .await
        .map_err(|e| DbError::io(&pricing, e))?
    {
        tokio::fs::write(&pricing, b"[]\n")
            .await
            .map_err(|e| DbError::io(&pricing, e))?;
        tracing::info!(path = %pricing.display(), "Initialized empty metric value store.");
    }
    Ok(())
}
