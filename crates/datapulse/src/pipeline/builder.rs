//! The analysis orchestrator.
//!
//! [`Analyzer`] runs every stage over a dataset and assembles one
//! [`AnalysisReport`]. The previous dataset is either passed explicitly to
//! [`Analyzer::analyze`] or taken from the analyzer's snapshot cache by
//! [`Analyzer::analyze_and_remember`].

use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::dataset::Dataset;
use crate::drift::DriftEstimator;
use crate::error::Result;
use crate::outliers::OutlierDetector;
use crate::pipeline::cache::SnapshotCache;
use crate::profiler::DataProfiler;
use crate::quality::DataQualityAnalyzer;
use crate::types::AnalysisReport;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs profiling, quality scoring, outlier detection and drift estimation.
///
/// Use [`Analyzer::builder()`] to create one with a custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use datapulse::{Analyzer, AnalysisConfig, Dataset};
///
/// let analyzer = Analyzer::builder()
///     .config(AnalysisConfig::builder().contamination(0.1).build()?)
///     .build()?;
///
/// let current = Dataset::from_csv_path("today.csv")?;
/// let previous = Dataset::from_csv_path("yesterday.csv")?;
/// let report = analyzer.analyze(&current, Some(&previous))?;
///
/// // Or let the analyzer remember the last dataset as the next baseline
/// let first = analyzer.analyze_and_remember(previous)?;
/// let second = analyzer.analyze_and_remember(current)?;
/// assert!(first.drift.is_none() && second.drift.is_some());
/// ```
#[derive(Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
    cache: SnapshotCache,
}

// Analyses may run from several threads against one shared analyzer.
static_assertions::assert_impl_all!(Analyzer: Send, Sync);

impl Analyzer {
    /// Create a new analyzer builder.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// The configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The snapshot cache used by [`analyze_and_remember`](Self::analyze_and_remember).
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Analyze `current`, comparing it against `previous` when given.
    ///
    /// `drift` is `None` exactly when `previous` is `None`.
    pub fn analyze(&self, current: &Dataset, previous: Option<&Dataset>) -> Result<AnalysisReport> {
        self.analyze_internal(current, previous).inspect_err(|e| {
            error!("Analysis failed: {}", e);
        })
    }

    /// Analyze `current` against the cached dataset, then cache `current`.
    ///
    /// The first call has no baseline and reports no drift. A failed analysis
    /// leaves the cached baseline unchanged.
    pub fn analyze_and_remember(&self, current: Dataset) -> Result<AnalysisReport> {
        self.cache
            .swap_with(current, |current, previous| self.analyze(current, previous))
    }

    fn analyze_internal(
        &self,
        current: &Dataset,
        previous: Option<&Dataset>,
    ) -> Result<AnalysisReport> {
        let start_time = Instant::now();
        let (rows, cols) = current.shape();
        info!("Analyzing dataset with {} rows and {} columns", rows, cols);

        // Step 1: Schema and summary
        let profile = DataProfiler::profile_dataset(current)?;

        // Step 2: Missing data
        let quality = DataQualityAnalyzer::missing_data(current);

        // Step 3: Per-column IQR outliers
        let outliers_iqr = OutlierDetector::iqr_report(current, &self.config)?;
        debug!(
            "IQR outliers: {} across {} numeric columns",
            outliers_iqr.values().sum::<usize>(),
            outliers_iqr.len()
        );

        // Step 4: Joint anomalies
        let outliers_iforest = OutlierDetector::anomaly_report(current, &self.config)?;

        // Step 5: Drift, only with a baseline
        let drift = match previous {
            Some(baseline) => Some(DriftEstimator::compare(baseline, current, &self.config)?),
            None => {
                debug!("No baseline dataset, skipping drift");
                None
            }
        };

        info!(
            "Analysis complete in {:?}: health score {}",
            start_time.elapsed(),
            quality.health_score
        );

        Ok(AnalysisReport {
            shape: (rows, cols),
            schema: profile.schema,
            columns: profile.columns,
            summary: profile.summary,
            missing: quality.missing,
            health_score: quality.health_score,
            outliers_iqr,
            outliers_iforest,
            drift,
        })
    }
}

/// Builder for [`Analyzer`].
#[derive(Debug, Default)]
pub struct AnalyzerBuilder {
    config: Option<AnalysisConfig>,
    baseline: Option<Dataset>,
}

impl AnalyzerBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Seed the snapshot cache with a baseline dataset.
    pub fn baseline(mut self, dataset: Dataset) -> Self {
        self.baseline = Some(dataset);
        self
    }

    /// Build the analyzer, validating the configuration.
    pub fn build(self) -> std::result::Result<Analyzer, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let cache = SnapshotCache::new();
        if let Some(baseline) = self.baseline {
            cache.replace(baseline);
        }

        Ok(Analyzer { config, cache })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnomalyReport, ColumnKind};
    use polars::prelude::*;

    fn people() -> Dataset {
        Dataset::new(
            df! {
                "name" => &["John", "Jane", "Bob"],
                "age" => &[25i64, 30, 35],
                "city" => &["NYC", "LA", "Chicago"],
            }
            .unwrap(),
        )
    }

    #[test]
    fn test_builder_default() {
        let analyzer = Analyzer::builder().build().unwrap();
        assert_eq!(analyzer.config(), &AnalysisConfig::default());
        assert!(analyzer.cache().is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = AnalysisConfig {
            contamination: 0.9,
            ..Default::default()
        };
        let err = Analyzer::builder().config(config).build().unwrap_err();
        assert!(matches!(err, ConfigValidationError::InvalidContamination(_)));
    }

    #[test]
    fn test_analyze_without_baseline_has_no_drift() {
        let analyzer = Analyzer::builder().build().unwrap();
        let report = analyzer.analyze(&people(), None).unwrap();

        assert_eq!(report.shape, (3, 3));
        assert_eq!(report.schema["age"], ColumnKind::Numeric);
        assert_eq!(report.schema["name"], ColumnKind::Categorical);
        assert_eq!(report.health_score, 100.0);
        assert_eq!(report.outliers_iqr["age"], 0);
        assert!(report.outliers_iqr.get("name").is_none());
        assert!(report.outliers_iforest.is_insufficient());
        assert!(report.drift.is_none());
    }

    #[test]
    fn test_analyze_with_baseline_has_drift() {
        let analyzer = Analyzer::builder().build().unwrap();
        let values: Vec<i64> = [25i64, 30, 35, 40, 45].repeat(20);
        let dataset = Dataset::new(df! { "age" => values }.unwrap());

        let report = analyzer.analyze(&dataset, Some(&dataset)).unwrap();
        let drift = report.drift.unwrap();
        assert!(drift["age"].psi().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_analyze_is_pure() {
        let analyzer = Analyzer::builder().build().unwrap();
        let dataset = people();

        let first = analyzer.analyze(&dataset, None).unwrap();
        let second = analyzer.analyze(&dataset, None).unwrap();
        assert_eq!(first, second);
        assert!(analyzer.cache().is_empty());
    }

    #[test]
    fn test_analyze_and_remember_uses_previous_call() {
        let analyzer = Analyzer::builder().build().unwrap();

        let first = analyzer.analyze_and_remember(people()).unwrap();
        assert!(first.drift.is_none());

        let second = analyzer.analyze_and_remember(people()).unwrap();
        let drift = second.drift.unwrap();
        assert!(drift.contains_key("age"));
        assert!(drift["age"].is_insufficient());
    }

    #[test]
    fn test_builder_baseline_seeds_cache() {
        let analyzer = Analyzer::builder().baseline(people()).build().unwrap();
        let report = analyzer.analyze_and_remember(people()).unwrap();
        assert!(report.drift.is_some());
    }

    #[test]
    fn test_no_numeric_columns() {
        let analyzer = Analyzer::builder().build().unwrap();
        let dataset = Dataset::new(
            df! {
                "name" => &["John", "Jane"],
                "city" => &["NYC", "LA"],
            }
            .unwrap(),
        );

        let report = analyzer.analyze(&dataset, None).unwrap();
        assert!(report.outliers_iqr.is_empty());
        assert_eq!(report.outliers_iforest, AnomalyReport::Skipped);
    }

    #[test]
    fn test_empty_dataset() {
        let analyzer = Analyzer::builder().build().unwrap();
        let report = analyzer.analyze(&Dataset::empty(), None).unwrap();

        assert!(report.schema.is_empty());
        assert!(report.summary.is_empty());
        assert_eq!(report.health_score, 100.0);
        assert_eq!(report.outliers_iforest, AnomalyReport::Skipped);
    }
}
