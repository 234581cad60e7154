//! Descriptive statistics for column summaries.

use crate::error::Result;
use crate::types::{ColumnKind, ColumnSummary};
use crate::utils::{most_frequent, numeric_values, quantile_sorted, sort_floats, text_values};
use polars::prelude::*;

/// Summarize one column according to its kind.
pub(crate) fn summarize_column(series: &Series, kind: ColumnKind) -> Result<ColumnSummary> {
    match kind {
        ColumnKind::Numeric => Ok(numeric_summary(numeric_values(series)?)),
        _ => Ok(categorical_summary(&text_values(series)?)),
    }
}

/// count, mean, std, min, quartiles and max of a numeric sample.
pub(crate) fn numeric_summary(mut values: Vec<f64>) -> ColumnSummary {
    let count = values.len();
    if count == 0 {
        return ColumnSummary::default();
    }

    sort_floats(&mut values);
    let mean = values.iter().sum::<f64>() / count as f64;

    ColumnSummary {
        count,
        mean: Some(mean),
        std: calculate_std(&values, mean),
        min: values.first().copied(),
        q25: quantile_sorted(&values, 0.25),
        q50: quantile_sorted(&values, 0.5),
        q75: quantile_sorted(&values, 0.75),
        max: values.last().copied(),
        ..Default::default()
    }
}

/// count, unique, top and freq of values rendered as text.
pub(crate) fn categorical_summary(values: &[String]) -> ColumnSummary {
    let count = values.len();
    if count == 0 {
        return ColumnSummary {
            unique: Some(0),
            ..Default::default()
        };
    }

    let unique = values
        .iter()
        .collect::<std::collections::HashSet<_>>()
        .len();
    let (top, freq) = match most_frequent(values) {
        Some((top, freq)) => (Some(top), Some(freq)),
        None => (None, None),
    };

    ColumnSummary {
        count,
        unique: Some(unique),
        top,
        freq,
        ..Default::default()
    }
}

/// Sample standard deviation (ddof = 1); undefined below two values.
pub(crate) fn calculate_std(values: &[f64], mean: f64) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}
