//! Shared utilities for the analysis engine.
//!
//! This module contains the dtype classification used when a dataset is
//! built, plus the numeric helpers (quantiles, rounding) shared by the
//! profiler, the outlier detectors and the drift estimator.

use crate::types::ColumnKind;
use indexmap::IndexMap;
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date, time, datetime or duration.
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(..) | DataType::Date | DataType::Time | DataType::Duration(..)
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Check if a DataType holds text labels.
#[inline]
pub fn is_categorical_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::String | DataType::Categorical(..) | DataType::Enum(..)
    )
}

/// Classify a DataType into the closed set of column kinds.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_boolean_dtype(dtype) {
        ColumnKind::Boolean
    } else if is_temporal_dtype(dtype) {
        ColumnKind::Temporal
    } else if is_categorical_dtype(dtype) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Other
    }
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Cast a numeric series to `f64`, keeping nulls. NaN and infinities are
/// treated as null.
pub fn numeric_cells(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let floats = series.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

/// Non-null values of a numeric series as `f64`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_cells(series)?.into_iter().flatten().collect())
}

/// Non-null values of any series rendered as text.
///
/// Uses a string cast when Polars supports it and falls back to the
/// `AnyValue` display for nested types.
pub fn text_values(series: &Series) -> PolarsResult<Vec<String>> {
    let non_null = series.drop_nulls();
    if let Ok(strings) = non_null.cast(&DataType::String)
        && let Ok(ca) = strings.str()
    {
        return Ok(ca.into_iter().flatten().map(str::to_string).collect());
    }

    let mut out = Vec::with_capacity(non_null.len());
    for idx in 0..non_null.len() {
        out.push(format!("{}", non_null.get(idx)?));
    }
    Ok(out)
}

/// Most frequent value and its count. Ties go to the value seen first.
pub fn most_frequent(values: &[String]) -> Option<(String, usize)> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, count)| (value.to_string(), count))
}

// =============================================================================
// Numeric Utilities
// =============================================================================

/// Sort a vector of finite floats in place.
pub fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

/// Linear-interpolation quantile of an already sorted slice.
///
/// Matches the default estimator of NumPy and pandas: the quantile `q` lies at
/// position `q * (n - 1)` and is interpolated between its neighbours.
/// Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    if frac == 0.0 {
        return Some(a);
    }
    // The gap between extreme neighbours can overflow to infinity.
    let gap = b - a;
    if gap.is_finite() {
        Some(a + gap * frac)
    } else {
        Some(a * (1.0 - frac) + b * frac)
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kind_mapping() {
        assert_eq!(column_kind(&DataType::Int64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Float32), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Categorical);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(column_kind(&DataType::Date), ColumnKind::Temporal);
        assert_eq!(column_kind(&DataType::Null), ColumnKind::Other);
    }

    #[test]
    fn test_quantile_sorted_linear_interpolation() {
        let values = [25.0, 30.0, 35.0, 40.0, 45.0, 100.0];
        // position 0.25 * 5 = 1.25 -> 30 + 0.25 * 5
        assert_eq!(quantile_sorted(&values, 0.25), Some(31.25));
        // position 3.75 -> 40 + 0.75 * 5
        assert_eq!(quantile_sorted(&values, 0.75), Some(43.75));
        assert_eq!(quantile_sorted(&values, 0.0), Some(25.0));
        assert_eq!(quantile_sorted(&values, 1.0), Some(100.0));
    }

    #[test]
    fn test_quantile_sorted_empty_and_single() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.9), Some(7.0));
    }

    #[test]
    fn test_quantile_sorted_extreme_neighbours_stay_finite() {
        let values = [-1.7e308, 1.7e308];
        assert_eq!(quantile_sorted(&values, 0.0), Some(-1.7e308));
        assert_eq!(quantile_sorted(&values, 0.5), Some(0.0));
        assert!(quantile_sorted(&values, 0.3).unwrap().is_finite());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(66.666_666, 2), 66.67);
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(100.0, 2), 100.0);
    }

    #[test]
    fn test_most_frequent_tie_goes_to_first_seen() {
        let values: Vec<String> = ["b", "a", "a", "b", "c"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(most_frequent(&values), Some(("b".to_string(), 2)));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn test_numeric_values_drops_nulls() {
        let series = Series::new("x".into(), &[Some(1i64), None, Some(3)]);
        assert_eq!(numeric_values(&series).unwrap(), vec![1.0, 3.0]);
        assert_eq!(numeric_cells(&series).unwrap(), vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_numeric_cells_drop_non_finite() {
        let series = Series::new(
            "x".into(),
            &[1.0f64, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 5.0],
        );
        assert_eq!(
            numeric_cells(&series).unwrap(),
            vec![Some(1.0), None, None, None, Some(5.0)]
        );
    }

    #[test]
    fn test_text_values_renders_booleans() {
        let series = Series::new("flag".into(), &[Some(true), None, Some(false)]);
        assert_eq!(text_values(&series).unwrap(), vec!["true", "false"]);
    }
}
