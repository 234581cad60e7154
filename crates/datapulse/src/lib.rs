//! DataPulse Analysis Engine
//!
//! Exploratory analysis of tabular datasets built with Rust and Polars.
//!
//! # Overview
//!
//! Given a dataset (and optionally the previously analyzed one), the engine
//! produces a single [`AnalysisReport`] with:
//!
//! - **Schema & Summary**: a kind per column and pandas-style descriptive statistics
//! - **Health Score**: per-column null counts and the share of non-null cells
//! - **IQR Outliers**: per numeric column, values outside the interquartile fences
//! - **Anomalies**: an isolation forest over rows complete in every numeric column
//! - **Drift**: per-column population stability index against the previous dataset
//!
//! Statistical shortfalls (too few values, constant columns) never fail an
//! analysis; they show up as markers inside the report.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datapulse::{AnalysisConfig, Analyzer, Dataset};
//!
//! let current = Dataset::from_csv_path("data/today.csv")?;
//! let previous = Dataset::from_csv_path("data/yesterday.csv")?;
//!
//! let analyzer = Analyzer::builder()
//!     .config(AnalysisConfig::builder().iqr_multiplier(3.0).build()?)
//!     .build()?;
//!
//! let report = analyzer.analyze(&current, Some(&previous))?;
//!
//! println!("Health score: {}", report.health_score);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! # Snapshot Cache
//!
//! [`Analyzer::analyze_and_remember`] keeps the last analyzed dataset as the
//! baseline for the next call. The first call reports no drift:
//!
//! ```rust,ignore
//! let analyzer = Analyzer::builder().build()?;
//!
//! let first = analyzer.analyze_and_remember(Dataset::from_csv_path("monday.csv")?)?;
//! assert!(first.drift.is_none());
//!
//! let second = analyzer.analyze_and_remember(Dataset::from_csv_path("tuesday.csv")?)?;
//! assert!(second.drift.is_some());
//! ```
//!
//! # Configuration
//!
//! Use [`AnalysisConfig`] to tune the detectors:
//!
//! ```rust,ignore
//! let config = AnalysisConfig::builder()
//!     .iqr_multiplier(1.5)     // IQR fence width
//!     .contamination(0.05)     // expected anomaly share
//!     .random_seed(42)         // isolation forest seed
//!     .psi_buckets(10)         // PSI quantile bins
//!     .build()?;
//! ```

pub mod config;
pub mod dataset;
pub mod drift;
pub mod error;
pub mod outliers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use dataset::Dataset;
pub use drift::DriftEstimator;
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use outliers::{IsolationForest, OutlierDetector};
pub use pipeline::{Analyzer, AnalyzerBuilder, SnapshotCache};
pub use profiler::{DataProfiler, DatasetProfile};
pub use quality::{DataQualityAnalyzer, MissingDataReport};
pub use reporting::{ExportedReport, ReportFormat, ReportGenerator, ReportTemplate};
pub use types::{
    AnalysisReport, AnomalyReport, ColumnDescriptor, ColumnKind, ColumnSummary, DriftOutcome,
    DriftReport, OutlierReport,
};
