use analytics::{estimate_statistical_power, interpret_effect_size, is_significant};
use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use configuration::{Config, LoggingSettings, ReportFormat, load_config, load_config_from};
use core_types::{AnalysisStatus, ExperimentResult, MetricCategory, MetricValue, ValidationRules};
use database::{AnalysisRepository, ExperimentAnalysis};
use economics::{fixed, with_thousands};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use processor::{AnalysisProcessor, ProcessOutcome, SkipCause};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing::Instrument;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// The main entry point for the Rally analysis application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; every setting has a default.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    let _log_guard = init_logging(&config.logging)?;

    let db_repo = database::connect(&config.storage.data_dir)
        .await
        .context("Failed to open the analysis store")?;

    let format = cli.format.unwrap_or(config.report.format);

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config, db_repo, format).await,
        Commands::Show(args) => handle_show(args, db_repo, format).await,
        Commands::SetValue(args) => handle_set_value(args, db_repo).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Differences-in-Differences analysis of A/B experiments, with dollar impact and
/// recommendations.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `config.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format. Overrides `report.format` from the configuration.
    #[arg(long, value_enum, global = true)]
    format: Option<ReportFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one or more experiment result files.
    Analyze(AnalyzeArgs),
    /// Show the latest analysis of an experiment.
    Show(ShowArgs),
    /// Create or update the dollar value of a metric.
    SetValue(SetValueArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Experiment result JSON files, one experiment per file.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct ShowArgs {
    experiment_id: String,
}

#[derive(Parser)]
struct SetValueArgs {
    /// The metric id, as used in experiment results (e.g., "conversion_rate").
    #[arg(long)]
    metric_id: String,

    /// Dollar value of one unit of change in the metric.
    #[arg(long, allow_negative_numbers = true)]
    dollars_per_unit: Decimal,

    #[arg(long)]
    unit: String,

    #[arg(long)]
    name: String,

    #[arg(long, default_value = "")]
    description: String,

    /// One of conversion, revenue, engagement, retention, other.
    #[arg(long, default_value = "other")]
    category: MetricCategory,

    #[arg(long)]
    updated_by: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    min_value: Option<Decimal>,

    #[arg(long, allow_negative_numbers = true)]
    max_value: Option<Decimal>,

    #[arg(long)]
    decimal_places: Option<u32>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console logs go through the progress-bar layer so they never tear a bar. A daily
/// rolling file is added when `logging.directory` is set; keep the guard alive
/// until exit so it gets flushed.
fn init_logging(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("Invalid logging.level '{}'", settings.level))?,
    };

    let indicatif_layer = IndicatifLayer::new();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(indicatif_layer.get_stderr_writer());

    let (file_layer, guard) = match &settings.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rally-analysis.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(indicatif_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// One row of the batch summary.
struct FileReport {
    file: PathBuf,
    outcome: anyhow::Result<ProcessOutcome>,
}

/// Handles the orchestration of a batch analysis.
async fn handle_analyze(
    args: AnalyzeArgs,
    config: &Config,
    db_repo: AnalysisRepository,
    format: ReportFormat,
) -> anyhow::Result<()> {
    let processor = AnalysisProcessor::new(config, db_repo);

    // Set up the progress bar
    let progress_bar = ProgressBar::new(args.files.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // Create concurrent tasks for each file
    let tasks: Vec<_> = args
        .files
        .into_iter()
        .map(|file| {
            let processor = processor.clone();
            let pb = progress_bar.clone();
            let span = tracing::info_span!("analyze", file = %file.display());

            tokio::spawn(
                async move {
                    let outcome = analyze_file(&processor, &file).await;
                    pb.inc(1);
                    pb.set_message(format!("{}", file.display()));
                    FileReport { file, outcome }
                }
                .instrument(span),
            )
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let mut reports = Vec::new();
    for joined in join_all(tasks).await {
        reports.push(joined.context("An analysis task panicked")?);
    }
    progress_bar.finish_and_clear();

    let failures = reports
        .iter()
        .filter(|r| !matches!(r.outcome, Ok(ProcessOutcome::Completed(_) | ProcessOutcome::Skipped { .. })))
        .count();

    match format {
        ReportFormat::Table => println!("{}", batch_table(&reports)),
        ReportFormat::Json => {
            let records: Vec<&ExperimentAnalysis> = reports
                .iter()
                .filter_map(|r| r.outcome.as_ref().ok().and_then(ProcessOutcome::record))
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    if failures > 0 {
        bail!("{} of {} experiment(s) could not be analyzed", failures, reports.len());
    }
    Ok(())
}

async fn analyze_file(processor: &AnalysisProcessor, file: &Path) -> anyhow::Result<ProcessOutcome> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let experiment: ExperimentResult = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid experiment result", file.display()))?;
    Ok(processor.process(experiment).await?)
}

fn batch_table(reports: &[FileReport]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "File",
        "Experiment",
        "Status",
        "Metrics (in/out)",
        "Daily Impact",
        "Annualized",
        "Confidence",
    ]);

    for report in reports {
        let file = report.file.display().to_string();
        match &report.outcome {
            Ok(ProcessOutcome::Skipped { experiment_id, cause }) => {
                let note = match cause {
                    SkipCause::AlreadyAnalyzed => "already analyzed",
                    SkipCause::NotAnExperiment => "not an experiment",
                };
                table.add_row(vec![
                    Cell::new(file),
                    Cell::new(experiment_id),
                    Cell::new("skipped").fg(Color::Yellow),
                    Cell::new(note),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
            Ok(ProcessOutcome::Completed(record) | ProcessOutcome::Failed(record)) => {
                table.add_row(record_row(file, record));
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(file),
                    Cell::new("-"),
                    Cell::new("error").fg(Color::Red),
                    Cell::new(format!("{:#}", e)),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }
    table
}

fn record_row(file: String, record: &ExperimentAnalysis) -> Vec<Cell> {
    let status = match record.status {
        AnalysisStatus::Complete => Cell::new("complete").fg(Color::Green),
        AnalysisStatus::Failed => Cell::new("failed").fg(Color::Red),
        AnalysisStatus::Processing => Cell::new("processing"),
    };
    let (daily, annual) = match &record.economic_impact {
        Some(impact) => (
            format!("${}", fixed(impact.total_impact, 2)),
            format!("${}", with_thousands(impact.annualized_impact)),
        ),
        None => ("-".to_string(), "-".to_string()),
    };
    let confidence = record
        .insights
        .as_ref()
        .map(|i| i.confidence.level.to_string())
        .unwrap_or_else(|| "-".to_string());

    vec![
        Cell::new(file),
        Cell::new(&record.experiment_id),
        status,
        Cell::new(format!(
            "{}/{}",
            record.did_results.len(),
            record.excluded_metrics.len()
        )),
        Cell::new(daily),
        Cell::new(annual),
        Cell::new(confidence),
    ]
}

// ==============================================================================
// Show Command Logic
// ==============================================================================

async fn handle_show(
    args: ShowArgs,
    db_repo: AnalysisRepository,
    format: ReportFormat,
) -> anyhow::Result<()> {
    let Some(record) = db_repo.latest_analysis(&args.experiment_id).await? else {
        bail!("No analysis found for experiment '{}'", args.experiment_id);
    };

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        ReportFormat::Table => print_record(&record),
    }
    Ok(())
}

fn print_record(record: &ExperimentAnalysis) {
    println!(
        "Experiment {} ({} to {}, {} days)",
        record.experiment_id,
        record.experiment_period.start_date,
        record.experiment_period.end_date,
        record.experiment_period.duration_days
    );
    println!(
        "Analysis {} at {}: {}",
        record.analysis_id,
        record.analysis_timestamp.to_rfc3339(),
        record.status
    );
    if let Some(error) = &record.error {
        println!("Error: {}", error);
    }

    let mut metrics = Table::new();
    metrics.load_preset(UTF8_FULL).set_header(vec![
        "Metric",
        "Treatment",
        "Control",
        "Change",
        "p-value",
        "Effect",
        "Power",
        "$ / day",
    ]);
    for (metric_id, r) in &record.did_results {
        let dollars = record
            .economic_impact
            .as_ref()
            .and_then(|e| e.metric_breakdown.get(metric_id))
            .map(|m| format!("${}", fixed(m.dollar_impact, 2)))
            .unwrap_or_else(|| "unpriced".to_string());
        let p_value = Cell::new(format!("{:.4}", r.p_value));
        let p_value = if is_significant(r.p_value, analytics::DEFAULT_ALPHA) {
            p_value.fg(Color::Green)
        } else {
            p_value
        };
        let power = estimate_statistical_power(
            r.effect_size,
            r.sample_size_treatment.min(r.sample_size_control),
        );

        metrics.add_row(vec![
            Cell::new(metric_id),
            Cell::new(format!("{:.4}", r.treatment_mean)),
            Cell::new(format!("{:.4}", r.control_mean)),
            Cell::new(format!("{:+.1}%", r.relative_difference * 100.0)),
            p_value,
            Cell::new(format!(
                "{:.2} ({})",
                r.effect_size,
                interpret_effect_size(r.effect_size)
            )),
            Cell::new(format!("{:.0}%", power * 100.0)),
            Cell::new(dollars),
        ]);
    }
    println!("{}", metrics);

    for (metric_id, reason) in &record.excluded_metrics {
        println!("Excluded {}: {}", metric_id, reason);
    }
    for skipped in &record.unpriced_metrics {
        println!("Not priced {}: {}", skipped.metric_id, skipped.reason);
    }

    if let Some(insights) = &record.insights {
        println!("\n{}", insights.summary);
        print_section("Key findings", &insights.key_findings);
        print_section("Recommendations", &insights.recommendations);
        print_section("Risk factors", &insights.risk_factors);
        println!(
            "\nImplementation: {} complexity, {}",
            insights.implementation_guidance.complexity,
            insights.implementation_guidance.estimated_effort
        );
        print_section(
            "Critical success factors",
            &insights.implementation_guidance.critical_success_factors,
        );
        println!("\n{}", insights.confidence.reasoning);
    }
}

fn print_section(title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!("\n{}:", title);
    for line in lines {
        println!("  - {}", line);
    }
}

// ==============================================================================
// Set-Value Command Logic
// ==============================================================================

async fn handle_set_value(args: SetValueArgs, db_repo: AnalysisRepository) -> anyhow::Result<()> {
    let has_rules =
        args.min_value.is_some() || args.max_value.is_some() || args.decimal_places.is_some();
    let value = MetricValue {
        metric_id: args.metric_id,
        dollars_per_unit: args.dollars_per_unit,
        unit: args.unit,
        name: args.name,
        description: args.description,
        category: args.category,
        last_updated: Utc::now(),
        updated_by: args.updated_by,
        version: 0,
        validation_rules: has_rules.then_some(ValidationRules {
            min_value: args.min_value,
            max_value: args.max_value,
            decimal_places: args.decimal_places,
        }),
    };

    let saved = db_repo
        .save_metric_value(value)
        .await
        .context("Failed to save metric value")?;
    println!(
        "Saved {} = ${} per {} (version {})",
        saved.metric_id, saved.dollars_per_unit, saved.unit, saved.version
    );
    Ok(())
}
