use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Column Metadata
// ============================================================================

/// Closed set of column kinds, fixed when a [`Dataset`](crate::Dataset) is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point numbers.
    Numeric,
    /// Free text or categorical labels.
    Categorical,
    /// True/false values.
    Boolean,
    /// Dates, times, datetimes and durations.
    Temporal,
    /// Anything else (nested types, all-null columns).
    Other,
}

impl ColumnKind {
    /// Label used in the schema map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
            Self::Other => "other",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column facts derived from a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    /// Physical dtype as reported by Polars (e.g. `i64`, `str`).
    pub dtype: String,
    pub null_count: usize,
    pub non_null_count: usize,
    /// Distinct non-null values.
    pub unique_count: usize,
}

/// Descriptive statistics for one column.
///
/// Every column carries every key so the serialized summary has a uniform
/// shape. Statistics that do not apply to the column's kind, or that are
/// undefined for its values (the mean of an all-null column, the standard
/// deviation of a single value), are `None` and serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of non-null values.
    pub count: usize,
    pub unique: Option<usize>,
    /// Most frequent value, rendered as text.
    pub top: Option<String>,
    /// Occurrences of `top`.
    pub freq: Option<usize>,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

// ============================================================================
// Detector Reports
// ============================================================================

/// Column name to number of values outside the IQR fences.
pub type OutlierReport = IndexMap<String, usize>;

/// Note attached to an anomaly report that was not computed.
pub const INSUFFICIENT_CLEAN_DATA: &str = "insufficient_clean_data";

/// Result of the isolation forest over all numeric columns.
///
/// Serializes to the compact shapes clients already consume:
/// `{}` when there is nothing numeric to look at,
/// `{"outlier_count": 0, "note": "insufficient_clean_data"}` when too few
/// complete rows remain, and `{"outlier_count": n}` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AnomalyWire", try_from = "AnomalyWire")]
pub enum AnomalyReport {
    /// The dataset has no numeric columns.
    Skipped,
    /// Fewer complete rows than the configured minimum.
    InsufficientData { complete_rows: usize },
    /// The detector ran over `complete_rows` rows.
    Computed {
        outlier_count: usize,
        complete_rows: usize,
    },
}

impl AnomalyReport {
    /// Rows flagged as anomalous; zero unless the detector ran.
    pub fn outlier_count(&self) -> usize {
        match self {
            Self::Computed { outlier_count, .. } => *outlier_count,
            _ => 0,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AnomalyWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    outlier_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    complete_rows: Option<usize>,
}

impl From<AnomalyReport> for AnomalyWire {
    fn from(report: AnomalyReport) -> Self {
        match report {
            AnomalyReport::Skipped => AnomalyWire::default(),
            AnomalyReport::InsufficientData { complete_rows } => AnomalyWire {
                outlier_count: Some(0),
                note: Some(INSUFFICIENT_CLEAN_DATA.to_string()),
                complete_rows: Some(complete_rows),
            },
            AnomalyReport::Computed {
                outlier_count,
                complete_rows,
            } => AnomalyWire {
                outlier_count: Some(outlier_count),
                note: None,
                complete_rows: Some(complete_rows),
            },
        }
    }
}

impl TryFrom<AnomalyWire> for AnomalyReport {
    type Error = String;

    fn try_from(wire: AnomalyWire) -> Result<Self, Self::Error> {
        match (wire.outlier_count, wire.note.as_deref()) {
            (None, None) => Ok(AnomalyReport::Skipped),
            (_, Some(INSUFFICIENT_CLEAN_DATA)) => Ok(AnomalyReport::InsufficientData {
                complete_rows: wire.complete_rows.unwrap_or(0),
            }),
            (Some(outlier_count), None) => Ok(AnomalyReport::Computed {
                outlier_count,
                complete_rows: wire.complete_rows.unwrap_or(outlier_count),
            }),
            (_, Some(other)) => Err(format!("unknown anomaly note '{other}'")),
        }
    }
}

/// Drift of one column between a baseline and a current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriftOutcome {
    /// PSI was computed.
    Computed {
        /// Population stability index, rounded to 3 decimals.
        psi: f64,
        /// Bins actually used after merging duplicate quantile edges.
        bins: usize,
    },
    /// One side had fewer non-null values than required.
    InsufficientData {
        required: usize,
        baseline_count: usize,
        current_count: usize,
    },
}

impl DriftOutcome {
    pub fn psi(&self) -> Option<f64> {
        match self {
            Self::Computed { psi, .. } => Some(*psi),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Column name to drift outcome.
pub type DriftReport = IndexMap<String, DriftOutcome>;

// ============================================================================
// Analysis Report
// ============================================================================

/// The full result of analyzing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// `(rows, columns)`.
    pub shape: (usize, usize),
    /// Column name to kind label.
    pub schema: IndexMap<String, ColumnKind>,
    pub columns: Vec<ColumnDescriptor>,
    pub summary: IndexMap<String, ColumnSummary>,
    /// Column name to null count.
    pub missing: IndexMap<String, usize>,
    /// Percentage of non-null cells, rounded to 2 decimals.
    pub health_score: f64,
    pub outliers_iqr: OutlierReport,
    pub outliers_iforest: AnomalyReport,
    /// `None` when no baseline dataset was supplied.
    pub drift: Option<DriftReport>,
}

impl AnalysisReport {
    /// Total IQR outliers across columns.
    pub fn total_iqr_outliers(&self) -> usize {
        self.outliers_iqr.values().sum()
    }

    /// Columns whose PSI reaches `threshold`.
    pub fn drifted_columns(&self, threshold: f64) -> Vec<&str> {
        self.drift
            .iter()
            .flat_map(|drift| drift.iter())
            .filter(|(_, outcome)| outcome.psi().is_some_and(|psi| psi >= threshold))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_kind_serializes_as_label() {
        assert_eq!(serde_json::to_value(ColumnKind::Numeric).unwrap(), json!("numeric"));
        assert_eq!(ColumnKind::Temporal.to_string(), "temporal");
    }

    #[test]
    fn test_summary_undefined_stats_are_null() {
        let summary = ColumnSummary {
            count: 0,
            ..Default::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["count"], json!(0));
        assert!(value["mean"].is_null());
        assert!(value["25%"].is_null());
        assert!(value["top"].is_null());
    }

    #[test]
    fn test_anomaly_report_wire_shapes() {
        assert_eq!(serde_json::to_value(AnomalyReport::Skipped).unwrap(), json!({}));
        assert_eq!(
            serde_json::to_value(AnomalyReport::InsufficientData { complete_rows: 4 }).unwrap(),
            json!({"outlier_count": 0, "note": "insufficient_clean_data", "complete_rows": 4})
        );
        assert_eq!(
            serde_json::to_value(AnomalyReport::Computed {
                outlier_count: 3,
                complete_rows: 60
            })
            .unwrap(),
            json!({"outlier_count": 3, "complete_rows": 60})
        );
    }

    #[test]
    fn test_anomaly_report_reads_original_shapes() {
        let skipped: AnomalyReport = serde_json::from_value(json!({})).unwrap();
        assert!(skipped.is_skipped());

        let insufficient: AnomalyReport =
            serde_json::from_value(json!({"outlier_count": 0, "note": "insufficient_clean_data"}))
                .unwrap();
        assert!(insufficient.is_insufficient());

        let computed: AnomalyReport =
            serde_json::from_value(json!({"outlier_count": 2})).unwrap();
        assert_eq!(computed.outlier_count(), 2);

        let unknown: Result<AnomalyReport, _> =
            serde_json::from_value(json!({"outlier_count": 0, "note": "mystery"}));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_drift_outcome_is_tagged() {
        let computed = DriftOutcome::Computed { psi: 0.12, bins: 4 };
        assert_eq!(
            serde_json::to_value(&computed).unwrap(),
            json!({"status": "computed", "psi": 0.12, "bins": 4})
        );

        let insufficient = DriftOutcome::InsufficientData {
            required: 5,
            baseline_count: 3,
            current_count: 10,
        };
        let value = serde_json::to_value(&insufficient).unwrap();
        assert_eq!(value["status"], json!("insufficient_data"));
        assert_eq!(insufficient.psi(), None);
    }

    #[test]
    fn test_drifted_columns() {
        let mut drift = DriftReport::new();
        drift.insert("a".into(), DriftOutcome::Computed { psi: 0.4, bins: 10 });
        drift.insert("b".into(), DriftOutcome::Computed { psi: 0.01, bins: 10 });
        drift.insert(
            "c".into(),
            DriftOutcome::InsufficientData {
                required: 5,
                baseline_count: 1,
                current_count: 1,
            },
        );

        let report = AnalysisReport {
            shape: (0, 0),
            schema: IndexMap::new(),
            columns: Vec::new(),
            summary: IndexMap::new(),
            missing: IndexMap::new(),
            health_score: 100.0,
            outliers_iqr: OutlierReport::new(),
            outliers_iforest: AnomalyReport::Skipped,
            drift: Some(drift),
        };
        assert_eq!(report.drifted_columns(0.25), vec!["a"]);
    }
}
