use crate::error::{PipelineError, ProcessorError};
use crate::pipeline::{AnalysisOutput, AnalysisPipeline};
use chrono::Utc;
use configuration::Config;
use core_types::{AnalysisStatus, ExperimentResult, MetricValueSnapshots};
use database::{AnalysisRepository, ExperimentAnalysis};
use uuid::Uuid;

/// Why an experiment result was not analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCause {
    /// A completed analysis already exists for this `(experiment_id, generated_at)`.
    AlreadyAnalyzed,
    /// The record carries no experiment id or no metrics.
    NotAnExperiment,
}

/// What `AnalysisProcessor::process` did with one experiment result.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Skipped {
        experiment_id: String,
        cause: SkipCause,
    },
    Completed(Box<ExperimentAnalysis>),
    /// The pipeline failed. The record has been persisted with status `failed`.
    Failed(Box<ExperimentAnalysis>),
}

impl ProcessOutcome {
    pub fn record(&self) -> Option<&ExperimentAnalysis> {
        match self {
            ProcessOutcome::Completed(record) | ProcessOutcome::Failed(record) => Some(record),
            ProcessOutcome::Skipped { .. } => None,
        }
    }
}

/// The boundary service: takes an experiment result, runs the pipeline against the
/// current pricing and persists the outcome.
#[derive(Debug, Clone)]
pub struct AnalysisProcessor {
    pipeline: AnalysisPipeline,
    db_repo: AnalysisRepository,
}

impl AnalysisProcessor {
    pub fn new(config: &Config, db_repo: AnalysisRepository) -> Self {
        Self {
            pipeline: AnalysisPipeline::new(config),
            db_repo,
        }
    }

    pub fn repository(&self) -> &AnalysisRepository {
        &self.db_repo
    }

    /// The main entry point to analyze one experiment result.
    pub async fn process(
        &self,
        experiment: ExperimentResult,
    ) -> Result<ProcessOutcome, ProcessorError> {
        let experiment_id = experiment.experiment_id.clone();

        if experiment_id.trim().is_empty() || experiment.metrics.is_empty() {
            tracing::warn!(experiment_id = %experiment_id, "Record is not a valid experiment result, skipping.");
            return Ok(ProcessOutcome::Skipped {
                experiment_id,
                cause: SkipCause::NotAnExperiment,
            });
        }

        // 1. Idempotency gate
        if self
            .db_repo
            .analysis_exists(&experiment_id, &experiment.generated_at)
            .await?
        {
            tracing::warn!(
                experiment_id = %experiment_id,
                generated_at = %experiment.generated_at,
                "Analysis already exists, skipping."
            );
            return Ok(ProcessOutcome::Skipped {
                experiment_id,
                cause: SkipCause::AlreadyAnalyzed,
            });
        }

        // 2. Freeze the pricing this analysis will use
        let metric_values = self.db_repo.get_metric_values().await?;
        if metric_values.is_empty() {
            tracing::warn!(experiment_id = %experiment_id, "No metric values found, economic impact will be limited.");
        }
        let snapshots: MetricValueSnapshots = metric_values
            .iter()
            .map(|(id, value)| (id.clone(), value.snapshot()))
            .collect();

        // 3. Record the attempt
        let analysis_id = Uuid::new_v4();
        let mut record = ExperimentAnalysis::processing(&experiment, analysis_id, Utc::now());
        record.metric_values_snapshot = snapshots.clone();
        self.db_repo.save_experiment_analysis(&record).await?;
        tracing::info!(
            experiment_id = %experiment_id,
            %analysis_id,
            metrics = experiment.metrics.len(),
            "Starting analysis."
        );

        // 4. Run the CPU-bound pipeline off the async workers
        let pipeline = self.pipeline.clone();
        let task = tokio::task::spawn_blocking(move || pipeline.run(&experiment, &snapshots));
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(source) => {
                tracing::error!(experiment_id = %experiment_id, %analysis_id, error = %source, "Analysis task aborted.");
                self.db_repo
                    .update_analysis_status(
                        &experiment_id,
                        analysis_id,
                        AnalysisStatus::Failed,
                        Some(source.to_string()),
                    )
                    .await?;
                return Err(ProcessorError::Task {
                    experiment_id,
                    source,
                });
            }
        };

        // 5. Persist the result
        match outcome {
            Ok(output) => {
                complete(&mut record, output);
                self.db_repo.save_experiment_analysis(&record).await?;
                tracing::info!(
                    experiment_id = %experiment_id,
                    %analysis_id,
                    included = record.did_results.len(),
                    excluded = record.excluded_metrics.len(),
                    "Analysis complete."
                );
                Ok(ProcessOutcome::Completed(Box::new(record)))
            }
            Err(e) => {
                tracing::error!(experiment_id = %experiment_id, %analysis_id, error = %e, "Analysis failed.");
                fail(&mut record, &e);
                self.db_repo.save_experiment_analysis(&record).await?;
                Ok(ProcessOutcome::Failed(Box::new(record)))
            }
        }
    }
}

fn complete(record: &mut ExperimentAnalysis, output: AnalysisOutput) {
    record.did_results = output.did.results();
    record.excluded_metrics = output.did.exclusions();
    record.economic_impact = Some(output.economics.impact);
    record.unpriced_metrics = output.economics.skipped;
    record.insights = Some(output.insights);
    record.experiment_period = output.period;
    record.status = AnalysisStatus::Complete;
    record.updated_at = Some(Utc::now());
}

fn fail(record: &mut ExperimentAnalysis, error: &PipelineError) {
    record.excluded_metrics = error.exclusions();
    record.status = AnalysisStatus::Failed;
    record.error = Some(error.to_string());
    record.updated_at = Some(Utc::now());
}
