//! Isolation forest over complete numeric rows.
//!
//! Each tree recursively splits a random subsample on a random feature at a
//! uniform random threshold. Anomalies are isolated close to the root, so
//! a short average path length means a high anomaly score
//! `s(x) = 2^(-E[h(x)] / c(psi))`.

use crate::utils::{quantile_sorted, sort_floats};
use rand::rngs::StdRng;
use rand::seq::{SliceRandom, index};
use rand::{Rng, SeedableRng};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// One isolation tree stored as a node arena; the root is node 0.
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(rows: &[Vec<f64>], sample: Vec<usize>, max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(rows, sample, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        rows: &[Vec<f64>],
        indices: Vec<usize>,
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            size: indices.len(),
        });

        if depth >= max_depth || indices.len() <= 1 {
            return node_id;
        }

        // Only features that still vary can separate the points.
        let n_features = rows[indices[0]].len();
        let candidates: Vec<(usize, f64, f64)> = (0..n_features)
            .filter_map(|feature| {
                let (lo, hi) = indices.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), &i| (lo.min(rows[i][feature]), hi.max(rows[i][feature])),
                );
                (hi > lo).then_some((feature, lo, hi))
            })
            .collect();

        let Some(&(feature, lo, hi)) = candidates.choose(rng) else {
            return node_id;
        };
        // Interpolate instead of sampling `lo..hi` so a range wider than
        // f64::MAX still yields a finite threshold.
        let t: f64 = rng.r#gen();
        let threshold = lo * (1.0 - t) + hi * t;

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rows[i][feature] < threshold);

        let left = self.grow(rows, left, depth + 1, max_depth, rng);
        let right = self.grow(rows, right, depth + 1, max_depth, rng);
        self.nodes[node_id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        node_id
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node_id = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[node_id] {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node_id = if row[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
            }
        }
    }
}

/// A fitted isolation forest.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit `n_trees` trees on subsamples of at most `max_samples` rows.
    ///
    /// The same `seed` and rows always produce the same forest.
    pub fn fit(rows: &[Vec<f64>], n_trees: usize, max_samples: usize, seed: u64) -> Self {
        let sample_size = max_samples.min(rows.len());
        if sample_size == 0 {
            return Self {
                trees: Vec::new(),
                sample_size,
            };
        }

        let max_depth = (sample_size as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let trees = (0..n_trees)
            .map(|_| {
                let sample = index::sample(&mut rng, rows.len(), sample_size).into_vec();
                IsolationTree::build(rows, sample, max_depth, &mut rng)
            })
            .collect();

        Self { trees, sample_size }
    }

    /// Anomaly score in (0, 1]; higher is more anomalous.
    pub fn score(&self, row: &[f64]) -> f64 {
        let normalizer = average_path_length(self.sample_size);
        if self.trees.is_empty() || normalizer == 0.0 {
            return 0.5;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(row))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / normalizer)
    }

    /// Scores for every row.
    pub fn score_samples(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.score(row)).collect()
    }
}

/// Flag rows whose score lies strictly above the `(1 - contamination)`
/// quantile of all scores.
pub fn flag_anomalies(scores: &[f64], contamination: f64) -> Vec<bool> {
    let mut sorted = scores.to_vec();
    sort_floats(&mut sorted);
    match quantile_sorted(&sorted, 1.0 - contamination) {
        Some(threshold) => scores.iter().map(|&s| s > threshold).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scattered_rows(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| vec![(i % 20) as f64, ((i * 7) % 20) as f64 + (i / 20) as f64 * 0.1])
            .collect()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is about 10.24
        assert!((average_path_length(256) - 10.24).abs() < 0.01);
    }

    #[test]
    fn test_isolated_point_scores_highest() {
        let mut rows = scattered_rows(50);
        rows.push(vec![1000.0, -1000.0]);
        let far = rows.len() - 1;

        let forest = IsolationForest::fit(&rows, 100, 256, 42);
        let scores = forest.score_samples(&rows);

        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(scores[far], max);
        assert!(scores[far] > 0.6, "far point scored {}", scores[far]);

        let flags = flag_anomalies(&scores, 0.05);
        assert!(flags[far]);
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let rows = scattered_rows(120);
        let a = IsolationForest::fit(&rows, 50, 64, 7).score_samples(&rows);
        let b = IsolationForest::fit(&rows, 50, 64, 7).score_samples(&rows);
        assert_eq!(a, b);
    }

    #[test]
    fn test_flag_rate_tracks_contamination() {
        let rows = scattered_rows(200);
        let forest = IsolationForest::fit(&rows, 100, 256, 42);
        let flagged = flag_anomalies(&forest.score_samples(&rows), 0.05)
            .into_iter()
            .filter(|&f| f)
            .count();

        assert!((1..=20).contains(&flagged), "flagged {flagged} of 200");
    }

    #[test]
    fn test_constant_rows_are_never_flagged() {
        let rows = vec![vec![3.0, 3.0]; 30];
        let forest = IsolationForest::fit(&rows, 10, 256, 42);
        let flags = flag_anomalies(&forest.score_samples(&rows), 0.05);
        assert_eq!(flags.len(), 30);
        assert!(flags.iter().all(|&f| !f));
    }

    #[test]
    fn test_fit_handles_range_wider_than_f64_max() {
        let mut rows = scattered_rows(20);
        rows.push(vec![-1.7e308, 0.0]);
        rows.push(vec![1.7e308, 0.0]);

        let forest = IsolationForest::fit(&rows, 50, 256, 42);
        let scores = forest.score_samples(&rows);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores[20] > scores[0]);
    }

    #[test]
    fn test_flag_anomalies_empty() {
        assert!(flag_anomalies(&[], 0.05).is_empty());
    }
}
