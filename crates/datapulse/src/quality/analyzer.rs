use crate::dataset::Dataset;
use crate::utils::round_to;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Null counts and the overall completeness score of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingDataReport {
    /// Column name to null count.
    pub missing: IndexMap<String, usize>,
    pub total_nulls: usize,
    pub total_cells: usize,
    /// Percentage of non-null cells in [0, 100], rounded to 2 decimals.
    pub health_score: f64,
}

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Count nulls per column and score overall completeness.
    pub fn missing_data(dataset: &Dataset) -> MissingDataReport {
        let missing: IndexMap<String, usize> = dataset
            .columns()
            .map(|(col, _)| (col.name().to_string(), col.null_count()))
            .collect();

        let total_nulls: usize = missing.values().sum();
        let total_cells = dataset.total_cells();
        let health_score = Self::health_score(total_nulls, total_cells);

        if health_score < 50.0 {
            warn!(
                "Dataset is mostly empty: {} of {} cells are null",
                total_nulls, total_cells
            );
        } else {
            debug!(
                "Missing data: {} of {} cells null, health score {}",
                total_nulls, total_cells, health_score
            );
        }

        MissingDataReport {
            missing,
            total_nulls,
            total_cells,
            health_score,
        }
    }

    /// `round(100 * (1 - nulls / cells), 2)`, or 100 when there are no cells.
    pub fn health_score(total_nulls: usize, total_cells: usize) -> f64 {
        if total_cells == 0 {
            return 100.0;
        }
        let nulls = total_nulls.min(total_cells) as f64;
        round_to(100.0 * (1.0 - nulls / total_cells as f64), 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_health_score_no_nulls() {
        let df = df! {
            "name" => &["John", "Jane", "Bob"],
            "age" => &[25i64, 30, 35],
        }
        .unwrap();
        let report = DataQualityAnalyzer::missing_data(&Dataset::new(df));

        assert_eq!(report.health_score, 100.0);
        assert_eq!(report.missing["name"], 0);
        assert_eq!(report.missing["age"], 0);
    }

    #[test]
    fn test_health_score_one_null_per_column() {
        let df = df! {
            "name" => &[Some("John"), Some("Jane"), None],
            "age" => &[Some(25i64), None, Some(35)],
            "salary" => &[Some(50000i64), Some(60000), None],
        }
        .unwrap();
        let report = DataQualityAnalyzer::missing_data(&Dataset::new(df));

        assert_eq!(report.missing["name"], 1);
        assert_eq!(report.missing["age"], 1);
        assert_eq!(report.missing["salary"], 1);
        assert_eq!(report.total_nulls, 3);
        assert_eq!(report.total_cells, 9);
        assert_eq!(report.health_score, 66.67);
    }

    #[test]
    fn test_health_score_empty_dataset() {
        let report = DataQualityAnalyzer::missing_data(&Dataset::empty());
        assert!(report.missing.is_empty());
        assert_eq!(report.health_score, 100.0);
    }

    #[test]
    fn test_health_score_bounds() {
        assert_eq!(DataQualityAnalyzer::health_score(0, 0), 100.0);
        assert_eq!(DataQualityAnalyzer::health_score(10, 10), 0.0);
        for nulls in 0..=7 {
            let score = DataQualityAnalyzer::health_score(nulls, 7);
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }
}
