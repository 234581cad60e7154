//! Interquartile-range fences for a single numeric sample.

use crate::utils::{quantile_sorted, sort_floats};

/// Quartiles and fences of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    /// Fences `Q1 - k * IQR` and `Q3 + k * IQR` of a sorted sample.
    pub fn from_sorted(sorted: &[f64], multiplier: f64) -> Option<Self> {
        let q1 = quantile_sorted(sorted, 0.25)?;
        let q3 = quantile_sorted(sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Whether a value lies strictly outside the fences.
    #[inline]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Count values strictly outside the IQR fences.
///
/// Samples smaller than `min_samples` report zero.
pub fn count_iqr_outliers(values: &[f64], multiplier: f64, min_samples: usize) -> usize {
    if values.len() < min_samples.max(1) {
        return 0;
    }

    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);

    match IqrFences::from_sorted(&sorted, multiplier) {
        Some(fences) => sorted.iter().filter(|&&v| fences.is_outlier(v)).count(),
        None => 0,
    }
}
