//! Population stability index between two numeric samples.
//!
//! The baseline defines the bins: its linear quantiles at `i / buckets`,
//! with duplicate edges merged. Both samples are binned on those edges and
//! `PSI = sum((e - a) * ln((e + eps) / (a + eps)))` over the bins.

use crate::utils::{quantile_sorted, round_to, sort_floats};

/// Decimal places kept in a reported PSI.
const PSI_DECIMALS: i32 = 3;

/// Quantile bin edges of a sorted baseline, duplicates merged.
///
/// A constant baseline yields a single edge.
pub fn quantile_edges(sorted: &[f64], buckets: usize) -> Vec<f64> {
    let buckets = buckets.max(1);
    let mut edges: Vec<f64> = (0..=buckets)
        .filter_map(|i| quantile_sorted(sorted, i as f64 / buckets as f64))
        .collect();
    edges.dedup();
    edges
}

/// Number of bins described by a set of edges.
pub fn bin_count(edges: &[f64]) -> usize {
    match edges.len() {
        0 => 0,
        1 => 1,
        n => n - 1,
    }
}

/// Bin a value on right-closed edges `(e[i-1], e[i]]`, the first bin
/// including its left edge. Values outside the edges land in no bin.
fn bin_index(value: f64, edges: &[f64]) -> Option<usize> {
    let (&first, &last) = (edges.first()?, edges.last()?);
    if value < first || value > last {
        return None;
    }
    if edges.len() == 1 {
        return Some(0);
    }
    match edges.partition_point(|&edge| edge < value) {
        0 => Some(0),
        idx => Some(idx - 1),
    }
}

/// Share of `values` falling into each bin.
pub fn bin_proportions(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let mut counts = vec![0usize; bin_count(edges)];
    for &value in values {
        if let Some(idx) = bin_index(value, edges) {
            counts[idx] += 1;
        }
    }

    let total = values.len().max(1) as f64;
    counts.into_iter().map(|c| c as f64 / total).collect()
}

/// PSI of `current` against `baseline`, rounded to 3 decimals, together
/// with the number of bins actually used.
///
/// Both samples must be non-empty and null-free.
pub fn population_stability_index(
    baseline: &[f64],
    current: &[f64],
    buckets: usize,
    epsilon: f64,
) -> (f64, usize) {
    let mut sorted = baseline.to_vec();
    sort_floats(&mut sorted);
    let edges = quantile_edges(&sorted, buckets);

    let expected = bin_proportions(baseline, &edges);
    let actual = bin_proportions(current, &edges);

    let psi: f64 = expected
        .iter()
        .zip(&actual)
        .map(|(&e, &a)| (e - a) * ((e + epsilon) / (a + epsilon)).ln())
        .sum();

    (round_to(psi, PSI_DECIMALS), bin_count(&edges))
}
