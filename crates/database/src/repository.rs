use crate::DbError;
use crate::record::ExperimentAnalysis;
use chrono::Utc;
use core_types::{AnalysisStatus, MetricValue};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const METRIC_VALUES_FILE: &str = "metric-values.json";
pub const ANALYSES_DIR: &str = "analyses";

/// The `AnalysisRepository` provides a high-level, application-specific interface
/// to the on-disk store. It encapsulates the file layout and all data access logic.
///
/// ```text
/// <root>/metric-values.json                         live pricing, one array
/// <root>/analyses/<experiment_id>/<analysis_id>.json one record per analysis
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisRepository {
    root: PathBuf,
    // Serializes read-modify-write cycles on the pricing file.
    pricing_lock: Arc<Mutex<()>>,
}

impl AnalysisRepository {
    /// Creates a repository rooted at `root`. Use `connect` or `initialize_store`
    /// to create the layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pricing_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // --- Pricing ---

    /// Fetches every live metric value, keyed by metric id in file order.
    pub async fn get_metric_values(&self) -> Result<IndexMap<String, MetricValue>, DbError> {
        let path = self.root.join(METRIC_VALUES_FILE);
        let values: Vec<MetricValue> = match read_json(&path).await? {
            Some(values) => values,
            None => Vec::new(),
        };
        Ok(values
            .into_iter()
            .map(|v| (v.metric_id.clone(), v))
            .collect())
    }

    pub async fn get_metric_value(&self, metric_id: &str) -> Result<MetricValue, DbError> {
        self.get_metric_values()
            .await?
            .shift_remove(metric_id)
            .ok_or(DbError::NotFound)
    }

    /// Inserts or replaces a metric value.
    ///
    /// The value is checked against its validation rules (or the stored entry's rules
    /// when it carries none). The version is bumped past the stored one and
    /// `last_updated` is set to now. Returns the value as stored.
    pub async fn save_metric_value(&self, mut value: MetricValue) -> Result<MetricValue, DbError> {
        let _guard = self.pricing_lock.lock().await;
        let mut values = self.get_metric_values().await?;

        if let Some(existing) = values.get(&value.metric_id) {
            if value.validation_rules.is_none() {
                value.validation_rules = existing.validation_rules.clone();
            }
            value.version = existing.version + 1;
        } else {
            value.version = value.version.max(1);
        }
        value.check_rules()?;
        value.last_updated = Utc::now();

        values.insert(value.metric_id.clone(), value.clone());
        let list: Vec<&MetricValue> = values.values().collect();
        write_json(&self.root.join(METRIC_VALUES_FILE), &list).await?;

        tracing::info!(
            metric_id = %value.metric_id,
            dollars_per_unit = %value.dollars_per_unit,
            version = value.version,
            "Saved metric value."
        );
        Ok(value)
    }

    // --- Analyses ---

    /// True when a completed analysis exists for this exact experiment result.
    /// Failed attempts do not count, so a failed result can be retried.
    pub async fn analysis_exists(
        &self,
        experiment_id: &str,
        generated_at: &str,
    ) -> Result<bool, DbError> {
        let exists = self
            .list_analyses(experiment_id)
            .await?
            .iter()
            .any(|a| a.generated_at == generated_at && a.is_complete());
        tracing::debug!(experiment_id, generated_at, exists, "Checked for existing analysis.");
        Ok(exists)
    }

    /// Writes (or overwrites) the record at its `(experiment_id, analysis_id)` key.
    pub async fn save_experiment_analysis(
        &self,
        analysis: &ExperimentAnalysis,
    ) -> Result<(), DbError> {
        let dir = self.experiment_dir(&analysis.experiment_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| DbError::io(&dir, e))?;
        write_json(&record_path(&dir, analysis.analysis_id), analysis).await?;
        tracing::debug!(
            experiment_id = %analysis.experiment_id,
            analysis_id = %analysis.analysis_id,
            status = %analysis.status,
            "Saved experiment analysis."
        );
        Ok(())
    }

    pub async fn get_analysis(
        &self,
        experiment_id: &str,
        analysis_id: Uuid,
    ) -> Result<ExperimentAnalysis, DbError> {
        let path = record_path(&self.experiment_dir(experiment_id), analysis_id);
        read_json::<ExperimentAnalysis>(&path)
            .await?
            .filter(|a| a.experiment_id == experiment_id)
            .ok_or(DbError::NotFound)
    }

    /// Sets the status (and optionally an error message) of an existing record.
    pub async fn update_analysis_status(
        &self,
        experiment_id: &str,
        analysis_id: Uuid,
        status: AnalysisStatus,
        error: Option<String>,
    ) -> Result<(), DbError> {
        let mut analysis = self.get_analysis(experiment_id, analysis_id).await?;
        analysis.status = status;
        if error.is_some() {
            analysis.error = error;
        }
        analysis.updated_at = Some(Utc::now());
        self.save_experiment_analysis(&analysis).await?;
        tracing::info!(experiment_id, %analysis_id, %status, "Updated analysis status.");
        Ok(())
    }

    /// Every record of an experiment, oldest first.
    pub async fn list_analyses(
        &self,
        experiment_id: &str,
    ) -> Result<Vec<ExperimentAnalysis>, DbError> {
        let dir = self.experiment_dir(experiment_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DbError::io(&dir, e)),
        };

        let mut analyses = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| DbError::io(&dir, e))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            // Distinct ids can share a sanitized directory name.
            match read_json::<ExperimentAnalysis>(&path).await? {
                Some(analysis) if analysis.experiment_id == experiment_id => analyses.push(analysis),
                _ => {}
            }
        }
        analyses.sort_by_key(|a| a.analysis_timestamp);
        Ok(analyses)
    }

    /// The most recent record of an experiment, whatever its status.
    pub async fn latest_analysis(
        &self,
        experiment_id: &str,
    ) -> Result<Option<ExperimentAnalysis>, DbError> {
        Ok(self.list_analyses(experiment_id).await?.pop())
    }

    fn experiment_dir(&self, experiment_id: &str) -> PathBuf {
        self.root.join(ANALYSES_DIR).join(sanitize(experiment_id))
    }
}

fn record_path(dir: &Path, analysis_id: Uuid) -> PathBuf {
    dir.join(format!("{}.json", analysis_id))
}

/// Keeps experiment ids from escaping the analyses directory.
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, DbError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DbError::io(path, e)),
    }
}

/// Writes through a temporary file so readers never see a half-written document.
async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DbError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| DbError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DbError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::initialize_store;
    use chrono::{Duration, TimeZone};
    use core_types::{
        ExperimentPeriod, ExperimentResult, MetricCategory, ValidationRules,
    };
    use rust_decimal_macros::dec;

    async fn store() -> (tempfile::TempDir, AnalysisRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = AnalysisRepository::new(dir.path());
        initialize_store(&repo).await.unwrap();
        (dir, repo)
    }

    fn metric_value(id: &str, dollars: rust_decimal::Decimal) -> MetricValue {
        MetricValue {
            metric_id: id.to_string(),
            dollars_per_unit: dollars,
            unit: "conversion".to_string(),
            name: id.to_string(),
            description: format!("{} value", id),
            category: MetricCategory::Conversion,
            last_updated: Utc.timestamp_opt(0, 0).unwrap(),
            updated_by: None,
            version: 0,
            validation_rules: None,
        }
    }

    fn experiment(generated_at: &str) -> ExperimentResult {
        ExperimentResult {
            experiment_id: "checkout-v2".to_string(),
            metrics: IndexMap::new(),
            generated_at: generated_at.to_string(),
            experiment_period: ExperimentPeriod {
                start_date: "2025-01-01".to_string(),
                end_date: "2025-01-11".to_string(),
                total_hours: 240,
            },
        }
    }

    #[tokio::test]
    async fn empty_store_has_no_pricing() {
        let (_dir, repo) = store().await;
        assert!(repo.get_metric_values().await.unwrap().is_empty());
        assert!(matches!(
            repo.get_metric_value("missing").await,
            Err(DbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn saving_a_metric_value_bumps_its_version() {
        let (_dir, repo) = store().await;

        let first = repo.save_metric_value(metric_value("conversion_rate", dec!(100))).await.unwrap();
        assert_eq!(first.version, 1);
        let second = repo.save_metric_value(metric_value("conversion_rate", dec!(120))).await.unwrap();
        assert_eq!(second.version, 2);
        repo.save_metric_value(metric_value("bounce_rate", dec!(-20))).await.unwrap();

        let values = repo.get_metric_values().await.unwrap();
        let ids: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(ids, ["conversion_rate", "bounce_rate"]);
        assert_eq!(values["conversion_rate"].dollars_per_unit, dec!(120));
    }

    #[tokio::test]
    async fn validation_rules_are_enforced_and_inherited() {
        let (_dir, repo) = store().await;

        let mut guarded = metric_value("aov", dec!(50));
        guarded.validation_rules = Some(ValidationRules {
            min_value: Some(dec!(0)),
            max_value: Some(dec!(500)),
            decimal_places: Some(2),
        });
        repo.save_metric_value(guarded).await.unwrap();

        // No rules on the update: the stored rules still apply.
        let err = repo
            .save_metric_value(metric_value("aov", dec!(900)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidMetricValue(_)));
        assert_eq!(repo.get_metric_value("aov").await.unwrap().dollars_per_unit, dec!(50));
    }

    #[tokio::test]
    async fn only_completed_analyses_block_reprocessing() {
        let (_dir, repo) = store().await;
        let exp = experiment("2025-01-11T00:00:00Z");

        let mut failed = ExperimentAnalysis::processing(&exp, Uuid::new_v4(), Utc::now());
        failed.status = AnalysisStatus::Failed;
        repo.save_experiment_analysis(&failed).await.unwrap();
        assert!(!repo.analysis_exists("checkout-v2", &exp.generated_at).await.unwrap());

        let mut complete = ExperimentAnalysis::processing(&exp, Uuid::new_v4(), Utc::now());
        complete.status = AnalysisStatus::Complete;
        repo.save_experiment_analysis(&complete).await.unwrap();
        assert!(repo.analysis_exists("checkout-v2", &exp.generated_at).await.unwrap());
        assert!(!repo.analysis_exists("checkout-v2", "2025-02-01T00:00:00Z").await.unwrap());
        assert!(!repo.analysis_exists("other", &exp.generated_at).await.unwrap());
    }

    #[tokio::test]
    async fn status_updates_and_latest_lookup() {
        let (_dir, repo) = store().await;
        let exp = experiment("2025-01-11T00:00:00Z");
        let t0 = Utc::now();

        let older = ExperimentAnalysis::processing(&exp, Uuid::new_v4(), t0);
        let newer = ExperimentAnalysis::processing(&exp, Uuid::new_v4(), t0 + Duration::seconds(5));
        repo.save_experiment_analysis(&newer).await.unwrap();
        repo.save_experiment_analysis(&older).await.unwrap();

        repo.update_analysis_status(
            "checkout-v2",
            newer.analysis_id,
            AnalysisStatus::Failed,
            Some("boom".to_string()),
        )
        .await
        .unwrap();

        let latest = repo.latest_analysis("checkout-v2").await.unwrap().unwrap();
        assert_eq!(latest.analysis_id, newer.analysis_id);
        assert_eq!(latest.status, AnalysisStatus::Failed);
        assert_eq!(latest.error.as_deref(), Some("boom"));
        assert!(latest.updated_at.is_some());

        assert_eq!(repo.list_analyses("checkout-v2").await.unwrap().len(), 2);
        assert!(repo.latest_analysis("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updating_a_missing_record_is_not_found() {
        let (_dir, repo) = store().await;
        let err = repo
            .update_analysis_status("x", Uuid::new_v4(), AnalysisStatus::Failed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn ids_sharing_a_directory_do_not_see_each_other() {
        let (_dir, repo) = store().await;
        let mut exp = experiment("g1");
        exp.experiment_id = "team/a".to_string();

        let mut record = ExperimentAnalysis::processing(&exp, Uuid::new_v4(), Utc::now());
        record.status = AnalysisStatus::Complete;
        repo.save_experiment_analysis(&record).await.unwrap();

        assert!(repo.analysis_exists("team/a", "g1").await.unwrap());
        assert!(!repo.analysis_exists("team_a", "g1").await.unwrap());
        assert!(repo.latest_analysis("team_a").await.unwrap().is_none());
        assert_eq!(
            repo.latest_analysis("team/a").await.unwrap().unwrap().analysis_id,
            record.analysis_id
        );        assert!(matches!(
            repo.get_analysis("team_a", record.analysis_id).await,
            Err(DbError::NotFound)
        ));
    }

    #[test]
    fn experiment_ids_cannot_escape_the_store() {
        assert_eq!(sanitize("../../etc"), "_.._etc");
        assert_eq!(sanitize("exp-1_a.b"), "exp-1_a.b");
        assert_eq!(sanitize("a/b c"), "a_b_c");
    }
}
