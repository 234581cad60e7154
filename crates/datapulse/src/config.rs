//! Configuration types for the analysis engine.
//!
//! Every numeric threshold the detectors use lives here so callers can
//! override it. Use [`AnalysisConfig::builder()`] for a validated config.

use serde::{Deserialize, Serialize};

/// Tunables for one [`Analyzer`](crate::Analyzer).
///
/// # Example
///
/// ```rust,ignore
/// use datapulse::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .iqr_multiplier(3.0)
///     .contamination(0.1)
///     .psi_buckets(20)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiplier applied to the IQR to place the fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Expected fraction of anomalous rows for the isolation forest, in (0, 0.5].
    /// Default: 0.05
    pub contamination: f64,

    /// Seed for the isolation forest's random number generator.
    /// Default: 42
    pub random_seed: u64,

    /// Number of isolation trees.
    /// Default: 100
    pub n_trees: usize,

    /// Maximum subsample size drawn for each tree.
    /// Default: 256
    pub max_samples: usize,

    /// Minimum non-null values before IQR fences are computed.
    /// Default: 3
    pub min_iqr_samples: usize,

    /// Minimum complete numeric rows before the isolation forest runs.
    /// Default: 10
    pub min_ensemble_rows: usize,

    /// Minimum non-null values on each side before PSI is computed.
    /// Default: 5
    pub min_drift_samples: usize,

    /// Requested number of quantile bins for PSI.
    /// Default: 10
    pub psi_buckets: usize,

    /// Smoothing added to both proportions inside the PSI logarithm.
    /// Default: 1e-6
    pub psi_epsilon: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            contamination: 0.05,
            random_seed: 42,
            n_trees: 100,
            max_samples: 256,
            min_iqr_samples: 3,
            min_ensemble_rows: 10,
            min_drift_samples: 5,
            psi_buckets: 10,
            psi_epsilon: 1e-6,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier <= 0.0 {
            return Err(ConfigValidationError::InvalidMultiplier(self.iqr_multiplier));
        }

        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ConfigValidationError::InvalidContamination(
                self.contamination,
            ));
        }

        if !self.psi_epsilon.is_finite() || self.psi_epsilon <= 0.0 {
            return Err(ConfigValidationError::InvalidEpsilon(self.psi_epsilon));
        }

        let counts = [
            ("n_trees", self.n_trees),
            ("max_samples", self.max_samples),
            ("min_iqr_samples", self.min_iqr_samples),
            ("min_ensemble_rows", self.min_ensemble_rows),
            ("min_drift_samples", self.min_drift_samples),
            ("psi_buckets", self.psi_buckets),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigValidationError::ZeroCount {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a positive finite number)")]
    InvalidMultiplier(f64),

    #[error("Invalid contamination: {0} (must be in (0.0, 0.5])")]
    InvalidContamination(f64),

    #[error("Invalid PSI epsilon: {0} (must be a positive finite number)")]
    InvalidEpsilon(f64),

    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    iqr_multiplier: Option<f64>,
    contamination: Option<f64>,
    random_seed: Option<u64>,
    n_trees: Option<usize>,
    max_samples: Option<usize>,
    min_iqr_samples: Option<usize>,
    min_ensemble_rows: Option<usize>,
    min_drift_samples: Option<usize>,
    psi_buckets: Option<usize>,
    psi_epsilon: Option<f64>,
}

impl AnalysisConfigBuilder {
    /// Set the IQR fence multiplier.
    ///
    /// Larger values widen the fences and flag fewer values.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the expected anomaly fraction for the isolation forest.
    pub fn contamination(mut self, contamination: f64) -> Self {
        self.contamination = Some(contamination);
        self
    }

    /// Set the isolation forest seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the number of isolation trees.
    pub fn n_trees(mut self, n: usize) -> Self {
        self.n_trees = Some(n);
        self
    }

    /// Set the per-tree subsample size.
    pub fn max_samples(mut self, n: usize) -> Self {
        self.max_samples = Some(n);
        self
    }

    /// Set the minimum sample size for IQR fences.
    pub fn min_iqr_samples(mut self, n: usize) -> Self {
        self.min_iqr_samples = Some(n);
        self
    }

    /// Set the minimum number of complete rows for the isolation forest.
    pub fn min_ensemble_rows(mut self, n: usize) -> Self {
        self.min_ensemble_rows = Some(n);
        self
    }

    /// Set the minimum sample size on each side of a drift comparison.
    pub fn min_drift_samples(mut self, n: usize) -> Self {
        self.min_drift_samples = Some(n);
        self
    }

    /// Set the requested PSI bucket count.
    pub fn psi_buckets(mut self, buckets: usize) -> Self {
        self.psi_buckets = Some(buckets);
        self
    }

    /// Set the PSI smoothing epsilon.
    pub fn psi_epsilon(mut self, epsilon: f64) -> Self {
        self.psi_epsilon = Some(epsilon);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            contamination: self.contamination.unwrap_or(defaults.contamination),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
            n_trees: self.n_trees.unwrap_or(defaults.n_trees),
            max_samples: self.max_samples.unwrap_or(defaults.max_samples),
            min_iqr_samples: self.min_iqr_samples.unwrap_or(defaults.min_iqr_samples),
            min_ensemble_rows: self.min_ensemble_rows.unwrap_or(defaults.min_ensemble_rows),
            min_drift_samples: self.min_drift_samples.unwrap_or(defaults.min_drift_samples),
            psi_buckets: self.psi_buckets.unwrap_or(defaults.psi_buckets),
            psi_epsilon: self.psi_epsilon.unwrap_or(defaults.psi_epsilon),
        };

        config.validate()?;
        Ok(config)
    }
}
