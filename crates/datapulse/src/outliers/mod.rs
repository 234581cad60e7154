//! Outlier detection module.
//!
//! Two independent detectors run over the numeric columns of a dataset:
//! - **IQR fences**, per column ([`iqr`])
//! - **Isolation forest**, jointly over complete rows ([`isolation_forest`])

pub mod iqr;
pub mod isolation_forest;

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{AnomalyReport, OutlierReport};
use crate::utils::numeric_values;
use tracing::{debug, info};

pub use iqr::{IqrFences, count_iqr_outliers};
pub use isolation_forest::{IsolationForest, flag_anomalies};

/// Runs the outlier detectors over a dataset.
pub struct OutlierDetector;

impl OutlierDetector {
    /// IQR outlier count for every numeric column.
    ///
    /// Non-numeric columns get no entry.
    pub fn iqr_report(dataset: &Dataset, config: &AnalysisConfig) -> Result<OutlierReport> {
        let mut report = OutlierReport::new();

        for col in dataset.numeric_columns() {
            let values = numeric_values(col.as_materialized_series())?;
            let count = count_iqr_outliers(&values, config.iqr_multiplier, config.min_iqr_samples);
            if values.len() < config.min_iqr_samples {
                debug!(
                    "'{}' has {} values, below the IQR minimum of {}",
                    col.name(),
                    values.len(),
                    config.min_iqr_samples
                );
            }
            report.insert(col.name().to_string(), count);
        }

        Ok(report)
    }

    /// Isolation forest anomaly count over rows complete in every numeric column.
    pub fn anomaly_report(dataset: &Dataset, config: &AnalysisConfig) -> Result<AnomalyReport> {
        if dataset.numeric_columns().next().is_none() {
            return Ok(AnomalyReport::Skipped);
        }

        let rows = dataset.complete_numeric_rows()?;
        let complete_rows = rows.len();
        if complete_rows < config.min_ensemble_rows {
            info!(
                "Skipping isolation forest: {} complete rows, need {}",
                complete_rows, config.min_ensemble_rows
            );
            return Ok(AnomalyReport::InsufficientData { complete_rows });
        }

        let forest = IsolationForest::fit(
            &rows,
            config.n_trees,
            config.max_samples,
            config.random_seed,
        );
        let outlier_count = flag_anomalies(&forest.score_samples(&rows), config.contamination)
            .into_iter()
            .filter(|&flagged| flagged)
            .count();

        debug!(
            "Isolation forest flagged {} of {} complete rows",
            outlier_count, complete_rows
        );

        Ok(AnomalyReport::Computed {
            outlier_count,
            complete_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_iqr_report_flags_both_columns() {
        let df = df! {
            "age" => &[25i64, 30, 35, 40, 45, 100],
            "salary" => &[50000i64, 60000, 70000, 80000, 90000, 200000],
        }
        .unwrap();
        let report = OutlierDetector::iqr_report(&Dataset::new(df), &config()).unwrap();

        assert!(report["age"] >= 1);
        assert!(report["salary"] >= 1);
    }

    #[test]
    fn test_iqr_report_skips_non_numeric_columns() {
        let df = df! {
            "name" => &["John", "Jane", "Bob"],
            "city" => &["NYC", "LA", "Chicago"],
        }
        .unwrap();
        let report = OutlierDetector::iqr_report(&Dataset::new(df), &config()).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_iqr_report_small_column_is_zero() {
        let df = df! {
            "x" => &[Some(1.0f64), None, Some(500.0), None],
        }
        .unwrap();
        let report = OutlierDetector::iqr_report(&Dataset::new(df), &config()).unwrap();
        assert_eq!(report["x"], 0);
    }

    #[test]
    fn test_anomaly_report_no_numeric_columns() {
        let df = df! { "name" => &["a", "b"] }.unwrap();
        let report = OutlierDetector::anomaly_report(&Dataset::new(df), &config()).unwrap();
        assert!(report.is_skipped());
    }

    #[test]
    fn test_anomaly_report_insufficient_rows() {
        let df = df! {
            "age" => &[25i64, 30, 35, 40, 45, 100],
            "salary" => &[50000i64, 60000, 70000, 80000, 90000, 200000],
        }
        .unwrap();
        let report = OutlierDetector::anomaly_report(&Dataset::new(df), &config()).unwrap();

        assert_eq!(report, AnomalyReport::InsufficientData { complete_rows: 6 });
        assert_eq!(report.outlier_count(), 0);
    }

    #[test]
    fn test_anomaly_report_counts_within_complete_rows() {
        let a: Vec<Option<f64>> = (0..40)
            .map(|i| if i % 10 == 3 { None } else { Some((i % 13) as f64) })
            .collect();
        let b: Vec<f64> = (0..40).map(|i| ((i * 5) % 11) as f64).collect();
        let df = df! { "a" => a, "b" => b }.unwrap();

        let report = OutlierDetector::anomaly_report(&Dataset::new(df), &config()).unwrap();
        match report {
            AnomalyReport::Computed {
                outlier_count,
                complete_rows,
            } => {
                assert_eq!(complete_rows, 36);
                assert!(outlier_count <= complete_rows);
            }
            other => panic!("expected computed report, got {other:?}"),
        }
    }
}
