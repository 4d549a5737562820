//! The synchronous analysis chain: DiD, then dollars, then insights.
//!
//! Nothing in here reads a clock, touches storage or generates ids, so running the
//! same experiment with the same pricing and options twice gives identical output.

use crate::error::PipelineError;
use analytics::DidResult;
use analyzer::error::AnalyzerError;
use analyzer::{DidAnalysis, DidAnalyzer};
use configuration::{Config, DidOptions, EconomicOptions};
use core_types::{AnalysisPeriod, ExperimentResult, MetricValueSnapshots};
use economics::{EconomicImpact, EconomicReport, EconomicTranslator, EconomicsError};
use indexmap::IndexMap;
use insights::{InsightAnalysis, InsightError, InsightSynthesizer};
use rust_decimal::Decimal;

/// Runs the DiD orchestrator over every metric of `experiment`.
pub fn run_did_analysis(
    experiment: &ExperimentResult,
    options: &DidOptions,
) -> Result<DidAnalysis, AnalyzerError> {
    DidAnalyzer::new(options.clone()).run(experiment)
}

pub fn compute_economic_impact(
    results: &IndexMap<String, DidResult>,
    snapshots: &MetricValueSnapshots,
    duration_days: Decimal,
    options: &EconomicOptions,
) -> Result<EconomicReport, EconomicsError> {
    EconomicTranslator::new(options.clone()).compute(results, snapshots, duration_days)
}

pub fn synthesize_insights(
    results: &IndexMap<String, DidResult>,
    economic: &EconomicImpact,
    period: &AnalysisPeriod,
    snapshots: &MetricValueSnapshots,
) -> Result<InsightAnalysis, InsightError> {
    InsightSynthesizer::new().synthesize(results, economic, period, snapshots)
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub did: DidAnalysis,
    pub economics: EconomicReport,
    pub insights: InsightAnalysis,
    pub period: AnalysisPeriod,
}

impl AnalysisOutput {
    pub fn results(&self) -> IndexMap<String, DidResult> {
        self.did.results()
    }
}

/// The three analysis stages wired together with one set of options.
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    analyzer: DidAnalyzer,
    translator: EconomicTranslator,
    synthesizer: InsightSynthesizer,
}

impl AnalysisPipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            analyzer: DidAnalyzer::new(config.did.clone()),
            translator: EconomicTranslator::new(config.economics.clone()),
            synthesizer: InsightSynthesizer::new(),
        }
    }

    /// Analyzes one experiment against a frozen pricing snapshot.
    ///
    /// The translator gets the exact duration (`total_hours / 24`), while the reported
    /// period rounds it up to whole days.
    pub fn run(
        &self,
        experiment: &ExperimentResult,
        snapshots: &MetricValueSnapshots,
    ) -> Result<AnalysisOutput, PipelineError> {
        let experiment_id = experiment.experiment_id.as_str();

        let did = self.analyzer.run(experiment)?;
        did.log_outcomes(experiment_id, self.analyzer.options().alpha);
        let results = did.results();

        let economics = self.translator.compute(
            &results,
            snapshots,
            experiment.experiment_period.duration_days_exact(),
        )?;
        economics.log_summary(experiment_id);

        let period = AnalysisPeriod::from(&experiment.experiment_period);
        let insights = self
            .synthesizer
            .synthesize(&results, &economics.impact, &period, snapshots)?;

        Ok(AnalysisOutput {
            did,
            economics,
            insights,
            period,
        })
    }
}
