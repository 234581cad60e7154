use crate::drift::SIGNIFICANT_PSI;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::AnalysisReport;
use chrono::Local;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Columns above this null share are listed as high-null in the highlights.
const HIGH_NULL_FRACTION: f64 = 0.5;

// ============================================================================
// Formats and Templates
// ============================================================================

/// Export formats a report can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
    Pdf,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            other => Err(AnalysisError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Named report layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportTemplate {
    Basic,
    Detailed,
    Executive,
    Technical,
}

impl ReportTemplate {
    pub const ALL: [ReportTemplate; 4] = [
        Self::Basic,
        Self::Detailed,
        Self::Executive,
        Self::Technical,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
            Self::Executive => "executive",
            Self::Technical => "technical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Basic => "Basic data summary report",
            Self::Detailed => "Detailed analysis report with charts",
            Self::Executive => "Executive summary report",
            Self::Technical => "Technical deep-dive report",
        }
    }
}

impl FromStr for ReportTemplate {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|template| template.name() == s.trim())
            .ok_or_else(|| AnalysisError::InvalidReportRequest(format!("unknown template '{s}'")))
    }
}

// ============================================================================
// Exported Report
// ============================================================================

/// An analysis together with export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path of the analyzed file, when it came from disk
    pub input_file: Option<String>,
    /// Path of the baseline file used for drift
    pub baseline_file: Option<String>,
    pub template: ReportTemplate,
    pub highlights: ReportHighlights,
    pub analysis: AnalysisReport,
}

/// Headline numbers pulled out of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportHighlights {
    pub rows: usize,
    pub columns: usize,
    pub health_score: f64,
    pub total_iqr_outliers: usize,
    /// Columns with at least one IQR outlier
    pub outlier_columns: Vec<String>,
    pub anomalies: usize,
    /// Columns with more than half of their values null
    pub high_null_columns: Vec<String>,
    /// Columns whose PSI reaches the significance level
    pub drifted_columns: Vec<String>,
}

impl ReportHighlights {
    pub fn from_analysis(analysis: &AnalysisReport) -> Self {
        let (rows, columns) = analysis.shape;

        let outlier_columns = analysis
            .outliers_iqr
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(name, _)| name.clone())
            .collect();

        let high_null_columns = analysis
            .missing
            .iter()
            .filter(|&(_, &nulls)| rows > 0 && nulls as f64 / rows as f64 > HIGH_NULL_FRACTION)
            .map(|(name, _)| name.clone())
            .collect();

        Self {
            rows,
            columns,
            health_score: analysis.health_score,
            total_iqr_outliers: analysis.total_iqr_outliers(),
            outlier_columns,
            anomalies: analysis.outliers_iforest.outlier_count(),
            high_null_columns,
            drifted_columns: analysis
                .drifted_columns(SIGNIFICANT_PSI)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Writes analysis reports to disk.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    ///
    /// `output_name`, when set, replaces the base name passed to
    /// [`generate`](Self::generate).
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Available templates, name to description.
    pub fn templates() -> IndexMap<&'static str, &'static str> {
        ReportTemplate::ALL
            .into_iter()
            .map(|template| (template.name(), template.description()))
            .collect()
    }

    /// Check that a report can be produced for `template` from `analysis`.
    pub fn validate_request(template: &str, analysis: &AnalysisReport) -> Result<ReportTemplate> {
        if analysis.shape.1 == 0 {
            return Err(AnalysisError::InvalidReportRequest(
                "analysis of an empty dataset".to_string(),
            ));
        }
        template.parse()
    }

    /// Wrap an analysis with export metadata.
    pub fn build_report(
        input_file: Option<&str>,
        baseline_file: Option<&str>,
        template: ReportTemplate,
        analysis: AnalysisReport,
    ) -> ExportedReport {
        ExportedReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(String::from),
            baseline_file: baseline_file.map(String::from),
            template,
            highlights: ReportHighlights::from_analysis(&analysis),
            analysis,
        }
    }

    /// Write a report in the requested format and return its path.
    ///
    /// Only JSON has a renderer; HTML and PDF are rejected.
    pub fn generate(
        &self,
        report: &ExportedReport,
        format: ReportFormat,
        base_name: &str,
    ) -> Result<PathBuf> {
        match format {
            ReportFormat::Json => self.write_report_to_file(report, base_name),
            ReportFormat::Html | ReportFormat::Pdf => {
                warn!("{} report rendering is not available", format);
                Err(AnalysisError::UnsupportedFormat(format.to_string()))
            }
        }
    }

    /// Write a report to `<output_dir>/<name>_report.json`.
    pub fn write_report_to_file(&self, report: &ExportedReport, base_name: &str) -> Result<PathBuf> {
        let name = self.output_name.as_deref().unwrap_or(base_name);
        if name.trim().is_empty() {
            return Err(AnalysisError::ReportGenerationFailed(
                "report name is empty".to_string(),
            ));
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(AnalysisError::from)
            .context(format!("Creating {}", self.output_dir.display()))?;

        let report_path = self.output_dir.join(format!("{name}_report.json"));
        let mut file = File::create(&report_path)
            .map_err(AnalysisError::from)
            .context(format!("Creating {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::pipeline::Analyzer;
    use polars::prelude::*;

    fn analysis() -> AnalysisReport {
        let df = df! {
            "name" => &[Some("John"), Some("Jane"), None],
            "age" => &[Some(25i64), None, None],
        }
        .unwrap();
        Analyzer::builder()
            .build()
            .unwrap()
            .analyze(&Dataset::new(df), None)
            .unwrap()
    }

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("datapulse-{label}-{}", std::process::id()))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("PDF".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        let err = "docx".parse::<ReportFormat>().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_templates() {
        let templates = ReportGenerator::templates();
        assert_eq!(
            templates.keys().copied().collect::<Vec<_>>(),
            vec!["basic", "detailed", "executive", "technical"]
        );
        assert_eq!(templates["basic"], "Basic data summary report");
    }

    #[test]
    fn test_validate_request() {
        let report = analysis();
        assert_eq!(
            ReportGenerator::validate_request("executive", &report).unwrap(),
            ReportTemplate::Executive
        );

        let err = ReportGenerator::validate_request("fancy", &report).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REPORT_REQUEST");

        let empty = Analyzer::builder()
            .build()
            .unwrap()
            .analyze(&Dataset::empty(), None)
            .unwrap();
        assert!(ReportGenerator::validate_request("basic", &empty).is_err());
    }

    #[test]
    fn test_highlights() {
        let highlights = ReportHighlights::from_analysis(&analysis());

        assert_eq!((highlights.rows, highlights.columns), (3, 2));
        assert_eq!(highlights.high_null_columns, vec!["age".to_string()]);
        assert!(highlights.drifted_columns.is_empty());
        assert_eq!(highlights.anomalies, 0);
    }

    #[test]
    fn test_write_json_report() {
        let dir = temp_dir("json");
        let generator = ReportGenerator::new(dir.clone(), None);
        let report =
            ReportGenerator::build_report(Some("people.csv"), None, ReportTemplate::Basic, analysis());

        let path = generator.generate(&report, ReportFormat::Json, "people").unwrap();
        assert_eq!(path, dir.join("people_report.json"));

        let written: ExportedReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.input_file.as_deref(), Some("people.csv"));
        assert_eq!(written.analysis.shape, (3, 2));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_output_name_overrides_base_name() {
        let dir = temp_dir("named");
        let generator = ReportGenerator::new(dir.clone(), Some("nightly".to_string()));
        let report = ReportGenerator::build_report(None, None, ReportTemplate::Technical, analysis());

        let path = generator.write_report_to_file(&report, "ignored").unwrap();
        assert_eq!(path, dir.join("nightly_report.json"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_html_and_pdf_unsupported() {
        let generator = ReportGenerator::new(temp_dir("unsupported"), None);
        let report = ReportGenerator::build_report(None, None, ReportTemplate::Basic, analysis());

        for format in [ReportFormat::Html, ReportFormat::Pdf] {
            let err = generator.generate(&report, format, "x").unwrap_err();
            assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        }
    }
}
