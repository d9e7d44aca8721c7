//! CART regression trees
//!
//! Squared-error trees shared by the forest families. `Best` scans every
//! threshold between consecutive distinct values (random forest); `Random`
//! draws one uniform threshold per feature inside the node's value range
//! (extremely randomized trees). The boosting family reuses the node
//! layout and traversal.

use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Nodes whose variance is below this are not split
const IMPURITY_EPSILON: f64 = f64::EPSILON;

/// Feature values closer than this are treated as equal
const FEATURE_THRESHOLD: f64 = 1e-7;

/// How split thresholds are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    Best,
    Random,
}

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    pub strategy: SplitStrategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    /// Rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    /// Total weighted variance reduction per feature
    impurity_decrease: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct NodeStats {
    count: f64,
    sum: f64,
    sum_sq: f64,
}

impl NodeStats {
    fn of(y: &[f64], samples: &[usize]) -> Self {
        let mut stats = Self {
            count: samples.len() as f64,
            sum: 0.0,
            sum_sq: 0.0,
        };
        for &s in samples {
            stats.sum += y[s];
            stats.sum_sq += y[s] * y[s];
        }
        stats
    }

    fn mean(&self) -> f64 {
        if self.count == 0.0 {
            0.0
        } else {
            self.sum / self.count
        }
    }

    fn impurity(&self) -> f64 {
        if self.count == 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        self.sum_sq / self.count - mean * mean
    }

    /// `sum² / n`; a split's score is the same quantity summed over children
    fn proxy(&self) -> f64 {
        self.sum * self.sum / self.count
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitChoice {
    feature: usize,
    threshold: f64,
    /// `sum_l² / n_l + sum_r² / n_r`; larger is a bigger variance reduction
    score: f64,
}

impl RegressionTree {
    /// Grow a tree on the given sample indices (repeats act as weights)
    pub fn fit<R: Rng + ?Sized>(
        x: ArrayView2<f64>,
        y: &[f64],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            n_features: x.ncols(),
            impurity_decrease: vec![0.0; x.ncols()],
        };
        tree.grow(x, y, samples, 0, params, rng);
        tree
    }

    /// Wrap nodes grown elsewhere
    pub fn from_nodes(nodes: Vec<TreeNode>, n_features: usize) -> Self {
        Self {
            nodes,
            n_features,
            impurity_decrease: vec![0.0; n_features],
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn impurity_decrease(&self) -> &[f64] {
        &self.impurity_decrease
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn grow<R: Rng + ?Sized>(
        &mut self,
        x: ArrayView2<f64>,
        y: &[f64],
        samples: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let id = self.nodes.len();
        let stats = NodeStats::of(y, &samples);
        self.nodes.push(TreeNode::Leaf { value: stats.mean() });

        let n = samples.len();
        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached
            || n < params.min_samples_split
            || n < 2 * params.min_samples_leaf
            || stats.impurity() <= IMPURITY_EPSILON
        {
            return id;
        }

        let choice = match params.strategy {
            SplitStrategy::Best => best_split(x, y, &samples, params.min_samples_leaf),
            SplitStrategy::Random => random_split(x, y, &samples, params.min_samples_leaf, rng),
        };
        let Some(choice) = choice else {
            return id;
        };

        self.impurity_decrease[choice.feature] += choice.score - stats.proxy();

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&s| x[[s, choice.feature]] <= choice.threshold);

        let left_id = self.grow(x, y, left, depth + 1, params, rng);
        let right_id = self.grow(x, y, right, depth + 1, params, rng);
        self.nodes[id] = TreeNode::Split {
            feature: choice.feature,
            threshold: choice.threshold,
            left: left_id,
            right: right_id,
        };
        id
    }
}

fn best_split(
    x: ArrayView2<f64>,
    y: &[f64],
    samples: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitChoice> {
    let n = samples.len();
    let total: f64 = samples.iter().map(|&s| y[s]).sum();
    let mut order = samples.to_vec();
    let mut best: Option<SplitChoice> = None;

    for feature in 0..x.ncols() {
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));
        if x[[order[n - 1], feature]] <= x[[order[0], feature]] + FEATURE_THRESHOLD {
            continue;
        }

        let mut left_sum = 0.0;
        for k in 1..n {
            left_sum += y[order[k - 1]];
            if k < min_samples_leaf || n - k < min_samples_leaf {
                continue;
            }
            let lo = x[[order[k - 1], feature]];
            let hi = x[[order[k], feature]];
            if hi <= lo + FEATURE_THRESHOLD {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
            if best.map_or(true, |b| score > b.score) {
                let mut threshold = lo / 2.0 + hi / 2.0;
                if threshold >= hi || !threshold.is_finite() {
                    threshold = lo;
                }
                best = Some(SplitChoice {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}

fn random_split<R: Rng + ?Sized>(
    x: ArrayView2<f64>,
    y: &[f64],
    samples: &[usize],
    min_samples_leaf: usize,
    rng: &mut R,
) -> Option<SplitChoice> {
    let n = samples.len();
    let mut best: Option<SplitChoice> = None;

    for feature in 0..x.ncols() {
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                let v = x[[s, feature]];
                (lo.min(v), hi.max(v))
            });
        if max <= min + FEATURE_THRESHOLD {
            continue;
        }

        let threshold = rng.gen_range(min..max);
        let mut left_count = 0usize;
        let mut left_sum = 0.0;
        let mut right_sum = 0.0;
        for &s in samples {
            if x[[s, feature]] <= threshold {
                left_count += 1;
                left_sum += y[s];
            } else {
                right_sum += y[s];
            }
        }

        let right_count = n - left_count;
        if left_count < min_samples_leaf.max(1) || right_count < min_samples_leaf.max(1) {
            continue;
        }

        let score =
            left_sum * left_sum / left_count as f64 + right_sum * right_sum / right_count as f64;
        if best.map_or(true, |b| score > b.score) {
            best = Some(SplitChoice {
                feature,
                threshold,
                score,
            });
        }
    }

    best
}
