//! Distribution drift between a baseline and a current dataset.
//!
//! Drift is measured per numeric column with the population stability
//! index ([`psi`]). Columns are matched by name; a column that exists in
//! only one dataset, or is not numeric in both, is left out of the report.

pub mod psi;

use crate::config::AnalysisConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::{DriftOutcome, DriftReport};
use tracing::{debug, info};

pub use psi::population_stability_index;

/// Conventional PSI level above which a shift is considered significant.
pub const SIGNIFICANT_PSI: f64 = 0.25;

pub struct DriftEstimator;

impl DriftEstimator {
    /// Compare every numeric column of `current` against `baseline`.
    pub fn compare(
        baseline: &Dataset,
        current: &Dataset,
        config: &AnalysisConfig,
    ) -> Result<DriftReport> {
        let mut report = DriftReport::new();

        for col in current.numeric_columns() {
            let name = col.name().as_str();

            let Some(baseline_kind) = baseline.kind(name) else {
                debug!("'{}' has no baseline column, skipping drift", name);
                continue;
            };
            if !baseline_kind.is_numeric() {
                debug!("Baseline '{}' is {}, skipping drift", name, baseline_kind);
                continue;
            }

            let expected = baseline.numeric_sample(name)?.unwrap_or_default();
            let actual = current.numeric_sample(name)?.unwrap_or_default();

            let outcome = Self::column_drift(&expected, &actual, config);
            report.insert(name.to_string(), outcome);
        }

        let drifted = report
            .values()
            .filter(|outcome| outcome.psi().is_some_and(|psi| psi >= SIGNIFICANT_PSI))
            .count();
        info!(
            "Drift computed for {} columns, {} above PSI {}",
            report.len(),
            drifted,
            SIGNIFICANT_PSI
        );

        Ok(report)
    }

    /// Drift of one column from its non-null baseline and current values.
    pub fn column_drift(
        baseline: &[f64],
        current: &[f64],
        config: &AnalysisConfig,
    ) -> DriftOutcome {
        let required = config.min_drift_samples.max(1);
        if baseline.len() < required || current.len() < required {
            return DriftOutcome::InsufficientData {
                required,
                baseline_count: baseline.len(),
                current_count: current.len(),
            };
        }

        let (psi, bins) =
            population_stability_index(baseline, current, config.psi_buckets, config.psi_epsilon);
        DriftOutcome::Computed { psi, bins }
    }
}
