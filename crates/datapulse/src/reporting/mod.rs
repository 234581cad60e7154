//! Report export module.
//!
//! This module wraps an [`AnalysisReport`](crate::AnalysisReport) with export
//! metadata and writes it to disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use datapulse::reporting::{ReportFormat, ReportGenerator};
//!
//! let template = ReportGenerator::validate_request("basic", &analysis)?;
//! let report = ReportGenerator::build_report(Some("data/today.csv"), None, template, analysis);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"), None);
//! generator.generate(&report, ReportFormat::Json, "today")?;
//! ```

mod generator;

pub use generator::{
    ExportedReport, ReportFormat, ReportGenerator, ReportHighlights, ReportTemplate,
};
