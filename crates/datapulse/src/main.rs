//! CLI entry point for the DataPulse analysis engine.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use datapulse::{
    AnalysisConfig, AnalysisError, AnalysisReport, Analyzer, AnomalyReport, Dataset,
    DriftOutcome, ReportFormat, ReportGenerator,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// CLI-compatible report format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliReportFormat {
    /// Pretty-printed JSON
    Json,
    /// HTML document
    Html,
    /// PDF document
    Pdf,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(cli: CliReportFormat) -> Self {
        match cli {
            CliReportFormat::Json => ReportFormat::Json,
            CliReportFormat::Html => ReportFormat::Html,
            CliReportFormat::Pdf => ReportFormat::Pdf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory data analysis for tabular snapshots",
    long_about = "Profiles a CSV dataset, scores missing data, detects outliers and \
                  anomalies, and measures drift against a previous snapshot.\n\n\
                  EXAMPLES:\n  \
                  # Analyze one file\n  \
                  datapulse -i data.csv\n\n  \
                  # Compare against yesterday's snapshot\n  \
                  datapulse -i today.csv -p yesterday.csv\n\n  \
                  # Machine-readable output\n  \
                  datapulse -i data.csv --json | jq .health_score\n\n  \
                  # Save a JSON report\n  \
                  datapulse -i data.csv -r -o reports/"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Previous snapshot to measure drift against
    #[arg(short, long)]
    previous: Option<String>,

    /// Output directory for reports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom report file name (without extension)
    ///
    /// If not specified, uses the input file name
    #[arg(long)]
    output_name: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// IQR fence multiplier
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Expected share of anomalous rows, in (0.0, 0.5]
    #[arg(long, default_value = "0.05")]
    contamination: f64,

    /// Seed for the isolation forest
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of trees in the isolation forest
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Number of quantile bins used for PSI
    #[arg(long, default_value = "10")]
    psi_buckets: usize,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the analysis report.
    #[arg(long)]
    json: bool,

    /// Write a report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Report template (basic, detailed, executive, technical)
    #[arg(long, default_value = "basic")]
    template: String,

    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    format: CliReportFormat,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = AnalysisConfig::builder()
        .iqr_multiplier(args.iqr_multiplier)
        .contamination(args.contamination)
        .random_seed(args.seed)
        .n_trees(args.trees)
        .psi_buckets(args.psi_buckets)
        .build()?;

    let analyzer = Analyzer::builder().config(config).build()?;

    info!("Loading dataset from: {}", args.input);
    let current = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", current.shape());

    let previous = match &args.previous {
        Some(path) => {
            info!("Loading previous snapshot from: {}", path);
            Some(load_csv_with_fallbacks(path)?)
        }
        None => None,
    };

    let report = analyzer
        .analyze(&current, previous.as_ref())
        .map_err(|e| {
            error!("Analysis failed: {}", e);
            anyhow!("Analysis failed: {}", e)
        })?;

    handle_output(report, &args)
}

/// Handle analysis output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write report to file
fn handle_output(report: AnalysisReport, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human_readable_summary(&report, args);
    }

    if args.emit_report {
        let template = ReportGenerator::validate_request(&args.template, &report)?;
        let exported = ReportGenerator::build_report(
            Some(args.input.as_str()),
            args.previous.as_deref(),
            template,
            report,
        );

        let generator =
            ReportGenerator::new(PathBuf::from(&args.output), args.output_name.clone());
        let report_path = generator.generate(
            &exported,
            args.format.into(),
            &extract_file_stem(&args.input),
        )?;
        info!("Report written to: {}", report_path.display());
    }

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the analysis.
fn print_human_readable_summary(report: &AnalysisReport, args: &Args) {
    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        args.input, report.shape.0, report.shape.1
    );
    if let Some(ref previous) = args.previous {
        println!("Baseline: {}", previous);
    }
    println!("Health Score: {:.2}%", report.health_score);
    println!();

    // Schema table
    println!(
        "{:<20} {:<12} {:<10} {:<10} {:<10}",
        "Column", "Kind", "Missing", "Unique", "Outliers"
    );
    println!("{}", "-".repeat(66));
    for col in &report.columns {
        let outliers = report
            .outliers_iqr
            .get(&col.name)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<12} {:<10} {:<10} {:<10}",
            truncate_str(&col.name, 19),
            col.kind.as_str(),
            col.null_count,
            col.unique_count,
            outliers
        );
    }
    println!();

    println!("Anomalies:");
    match report.outliers_iforest {
        AnomalyReport::Skipped => println!("  skipped (no numeric columns)"),
        AnomalyReport::InsufficientData { complete_rows } => {
            println!("  insufficient clean data ({} complete rows)", complete_rows)
        }
        AnomalyReport::Computed {
            outlier_count,
            complete_rows,
        } => println!("  {} of {} complete rows", outlier_count, complete_rows),
    }
    println!();

    if let Some(ref drift) = report.drift {
        println!("Drift (PSI):");
        if drift.is_empty() {
            println!("  no shared numeric columns");
        }
        for (name, outcome) in drift {
            match outcome {
                DriftOutcome::Computed { psi, bins } => {
                    println!("  {:<20} {:>8.3}  ({} bins)", truncate_str(name, 19), psi, bins)
                }
                DriftOutcome::InsufficientData {
                    baseline_count,
                    current_count,
                    ..
                } => println!(
                    "  {:<20} insufficient data ({} baseline, {} current)",
                    truncate_str(name, 19),
                    baseline_count,
                    current_count
                ),
            }
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save a JSON report");
    println!("{}", "=".repeat(80));
}

fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Load CSV, retrying on cleaned content when the file is malformed.
fn load_csv_with_fallbacks(path: &str) -> Result<Dataset> {
    match Dataset::from_csv_path(path) {
        Ok(dataset) => return Ok(dataset),
        Err(AnalysisError::MalformedInput(reason)) => {
            debug!("Standard loading failed: {}", reason);
        }
        Err(e) => return Err(e.into()),
    }

    warn!("Retrying {} with cleaned quoting", path);
    let content = std::fs::read_to_string(path).with_context(|| format!("Reading {path}"))?;
    Ok(Dataset::from_csv_str(&clean_csv_content(&content))?)
}

/// Clean CSV content
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("age", 19), "age");
        assert_eq!(truncate_str("a_very_long_column_name_indeed", 10), "a_very_...");
    }

    #[test]
    fn test_extract_file_stem() {
        assert_eq!(extract_file_stem("data/today.csv"), "today");
        assert_eq!(extract_file_stem(""), "output");
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n\"\"x\"\",1\n");
        assert_eq!(cleaned, "a,b\n\"x\",1");
    }

    #[test]
    fn test_cli_parses() {
        let args =
            Args::try_parse_from(["datapulse", "-i", "a.csv", "-p", "b.csv", "--json"]).unwrap();
        assert_eq!(args.previous.as_deref(), Some("b.csv"));
        assert!(args.json);
        assert_eq!(args.template, "basic");
    }
}
