//! Histogram gradient boosting for squared error
//!
//! Features are quantized once into at most `max_bins` bins. Each boosting
//! iteration grows one tree best-first: the open leaf with the largest
//! split gain is split next, until `max_leaf_nodes` is reached or no leaf
//! has a positive gain. A child's histogram is built directly for the
//! smaller child and by subtraction for the larger one.
//!
//! With early stopping a seeded random fraction of the rows is held out
//! before binning. Training stops once the held-out loss has not improved
//! by more than `tol` for `n_iter_no_change` consecutive iterations.

use super::check_predict_input;
use super::tree::{RegressionTree, TreeNode};
use crate::error::{Result, RuntimeError};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `EarlyStopping::Auto` turns on above this many training rows
const AUTO_EARLY_STOPPING_ROWS: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStopping {
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl EarlyStopping {
    fn applies(self, n_rows: usize) -> bool {
        match self {
            EarlyStopping::Auto => n_rows > AUTO_EARLY_STOPPING_ROWS,
            EarlyStopping::Enabled => true,
            EarlyStopping::Disabled => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    #[serde(default)]
    pub max_depth: Option<usize>,
    pub learning_rate: f64,
    pub max_iter: usize,
    #[serde(default = "default_max_leaf_nodes")]
    pub max_leaf_nodes: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default)]
    pub l2_regularization: f64,
    #[serde(default = "default_max_bins")]
    pub max_bins: usize,
    #[serde(default)]
    pub early_stopping: EarlyStopping,
    /// Share of rows held out to monitor the loss
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    #[serde(default = "default_n_iter_no_change")]
    pub n_iter_no_change: usize,
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_max_leaf_nodes() -> usize {
    31
}

fn default_min_samples_leaf() -> usize {
    20
}

fn default_max_bins() -> usize {
    255
}

fn default_validation_fraction() -> f64 {
    0.1
}

fn default_n_iter_no_change() -> usize {
    10
}

fn default_tol() -> f64 {
    1e-7
}

impl BoostingParams {
    pub fn new(max_depth: Option<usize>, learning_rate: f64, max_iter: usize) -> Self {
        Self {
            max_depth,
            learning_rate,
            max_iter,
            max_leaf_nodes: default_max_leaf_nodes(),
            min_samples_leaf: default_min_samples_leaf(),
            l2_regularization: 0.0,
            max_bins: default_max_bins(),
            early_stopping: EarlyStopping::default(),
            validation_fraction: default_validation_fraction(),
            n_iter_no_change: default_n_iter_no_change(),
            tol: default_tol(),
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RuntimeError::InvalidConfig(msg.to_string()));
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid("learning_rate must be positive");
        }
        if self.max_leaf_nodes < 2 {
            return invalid("max_leaf_nodes must be at least 2");
        }
        if self.min_samples_leaf == 0 {
            return invalid("min_samples_leaf must be at least 1");
        }
        if self.l2_regularization < 0.0 {
            return invalid("l2_regularization must be non-negative");
        }
        if !(2..=u16::MAX as usize).contains(&self.max_bins) {
            return invalid("max_bins must be between 2 and 65535");
        }
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return invalid("validation_fraction must be in (0, 1)");
        }
        if self.n_iter_no_change == 0 {
            return invalid("n_iter_no_change must be at least 1");
        }
        if !(self.tol >= 0.0 && self.tol.is_finite()) {
            return invalid("tol must be non-negative");
        }
        Ok(())
    }
}

/// A fitted boosted ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingModel {
    pub params: BoostingParams,
    /// Initial prediction (training target mean)
    baseline: f64,
    n_features: usize,
    /// Learning rate is already folded into leaf values
    trees: Vec<RegressionTree>,
}

impl BoostingModel {
    /// Fit the ensemble; `seed` only picks the early-stopping holdout
    pub fn fit(params: BoostingParams, x: ArrayView2<f64>, y: &[f64], seed: u64) -> Result<Self> {
        params.validate()?;
        if !params.early_stopping.applies(x.nrows()) {
            return Self::fit_rows(params, x, y, None);
        }

        let (train, validation) = holdout_indices(x.nrows(), params.validation_fraction, seed)?;
        let train_y: Vec<f64> = train.iter().map(|&i| y[i]).collect();
        let monitor = ValidationSet {
            x: x.select(Axis(0), &validation),
            y: validation.iter().map(|&i| y[i]).collect(),
        };
        Self::fit_rows(params, x.select(Axis(0), &train).view(), &train_y, Some(monitor))
    }

    fn fit_rows(
        params: BoostingParams,
        x: ArrayView2<f64>,
        y: &[f64],
        validation: Option<ValidationSet>,
    ) -> Result<Self> {
        let n = x.nrows();
        let n_features = x.ncols();

        let edges: Vec<Vec<f64>> = (0..n_features)
            .map(|f| bin_edges(x.column(f), params.max_bins))
            .collect();
        let mut binned = Vec::with_capacity(n * n_features);
        for i in 0..n {
            for (f, feature_edges) in edges.iter().enumerate() {
                binned.push(bin_index(feature_edges, x[[i, f]]) as u16);
            }
        }

        let grower = Grower {
            binned: &binned,
            n_features,
            n_bins: edges.iter().map(|e| e.len() + 1).collect(),
            edges: &edges,
            params: &params,
        };

        let baseline = y.iter().sum::<f64>() / n as f64;
        let mut raw = vec![baseline; n];
        let mut trees = Vec::with_capacity(params.max_iter);
        let mut stopper = validation.map(|v| EarlyStopper::new(v, baseline, &params));

        for _ in 0..params.max_iter {
            let gradients: Vec<f64> = raw.iter().zip(y).map(|(p, t)| p - t).collect();
            let (nodes, leaves) = grower.grow(&gradients);
            for leaf in &leaves {
                if let TreeNode::Leaf { value } = nodes[leaf.node] {
                    for &s in &leaf.samples {
                        raw[s] += value;
                    }
                }
            }
            let tree = RegressionTree::from_nodes(nodes, n_features);
            let stop = stopper.as_mut().is_some_and(|s| s.record(&tree));
            trees.push(tree);
            if stop {
                debug!("Early stopping after {} iterations", trees.len());
                break;
            }
        }

        Ok(Self {
            params,
            baseline,
            n_features,
            trees,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<f64>> {
        check_predict_input(x, self.n_features)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| self.baseline + self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>())
            .collect())
    }
}

/// Seeded shuffle into sorted (train, validation) row indices
fn holdout_indices(n: usize, fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>)> {
    let n_validation = (fraction * n as f64).ceil() as usize;
    if n_validation == 0 || n_validation >= n {
        return Err(RuntimeError::InvalidConfig(format!(
            "validation_fraction {} leaves no rows to train or validate on ({} rows)",
            fraction, n
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
    let mut validation = order[..n_validation].to_vec();
    let mut train = order[n_validation..].to_vec();
    validation.sort_unstable();
    train.sort_unstable();
    Ok((train, validation))
}

struct ValidationSet {
    x: Array2<f64>,
    y: Vec<f64>,
}

/// Tracks the held-out score (negative half squared error) per iteration
struct EarlyStopper {
    validation: ValidationSet,
    raw: Vec<f64>,
    scores: Vec<f64>,
    n_iter_no_change: usize,
    tol: f64,
}

impl EarlyStopper {
    fn new(validation: ValidationSet, baseline: f64, params: &BoostingParams) -> Self {
        let raw = vec![baseline; validation.y.len()];
        let mut stopper = Self {
            validation,
            raw,
            scores: Vec::with_capacity(params.max_iter + 1),
            n_iter_no_change: params.n_iter_no_change,
            tol: params.tol,
        };
        let initial = stopper.score();
        stopper.scores.push(initial);
        stopper
    }

    fn score(&self) -> f64 {
        let squared: f64 = self
            .raw
            .iter()
            .zip(&self.validation.y)
            .map(|(p, t)| (p - t) * (p - t))
            .sum();
        -0.5 * squared / self.raw.len() as f64
    }

    /// Add `tree` to the held-out predictions; true when training should stop
    fn record(&mut self, tree: &RegressionTree) -> bool {
        for (raw, row) in self.raw.iter_mut().zip(self.validation.x.rows()) {
            *raw += tree.predict_row(row);
        }
        self.scores.push(self.score());

        let n = self.n_iter_no_change;
        if self.scores.len() <= n {
            return false;
        }
        let reference = self.scores[self.scores.len() - n - 1] + self.tol;
        !self.scores[self.scores.len() - n..].iter().any(|&s| s > reference)
    }
}

/// Bin thresholds for one feature
///
/// With at most `max_bins` distinct values the thresholds are the midpoints
/// between consecutive values; otherwise they are midpoint-interpolated
/// quantiles at `i / max_bins`, deduplicated.
fn bin_edges(column: ArrayView1<f64>, max_bins: usize) -> Vec<f64> {
    let mut values: Vec<f64> = column.iter().copied().collect();
    values.sort_by(f64::total_cmp);
    let mut distinct = values.clone();
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct.windows(2).map(|w| w[0] + (w[1] - w[0]) / 2.0).collect();
    }

    let last = (values.len() - 1) as f64;
    let mut edges: Vec<f64> = (1..max_bins)
        .map(|i| {
            let rank = i as f64 / max_bins as f64 * last;
            let lo = values[rank.floor() as usize];
            let hi = values[rank.ceil() as usize];
            lo + (hi - lo) / 2.0
        })
        .collect();
    edges.dedup();
    edges
}

/// Values equal to a threshold fall in the lower bin
fn bin_index(edges: &[f64], value: f64) -> usize {
    edges.partition_point(|&e| e < value)
}

#[derive(Debug, Clone, Copy, Default)]
struct BinStat {
    gradient: f64,
    count: usize,
}

type Histogram = Vec<Vec<BinStat>>;

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct OpenLeaf {
    node: usize,
    depth: usize,
    samples: Vec<usize>,
    gradient_sum: f64,
    histogram: Histogram,
    split: Option<SplitCandidate>,
}

struct Grower<'a> {
    binned: &'a [u16],
    n_features: usize,
    n_bins: Vec<usize>,
    edges: &'a [Vec<f64>],
    params: &'a BoostingParams,
}

impl Grower<'_> {
    /// Grow one tree on the current gradients, returning its nodes and the
    /// final leaves with their sample sets
    fn grow(&self, gradients: &[f64]) -> (Vec<TreeNode>, Vec<OpenLeaf>) {
        let all: Vec<usize> = (0..gradients.len()).collect();
        let mut nodes = vec![TreeNode::Leaf { value: 0.0 }];
        let root_histogram = self.histogram(&all, gradients);
        let mut open = vec![self.open_leaf(0, 0, all, root_histogram, gradients)];
        let mut leaf_count = 1;

        while leaf_count < self.params.max_leaf_nodes {
            let Some(index) = best_open_leaf(&open) else {
                break;
            };
            let OpenLeaf {
                node,
                depth,
                samples,
                histogram,
                split,
                ..
            } = open.remove(index);
            let Some(split) = split else {
                break;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&s| self.binned[s * self.n_features + split.feature] as usize <= split.bin);

            let (left_histogram, right_histogram) = if left.len() <= right.len() {
                let small = self.histogram(&left, gradients);
                let large = subtract(&histogram, &small);
                (small, large)
            } else {
                let small = self.histogram(&right, gradients);
                let large = subtract(&histogram, &small);
                (large, small)
            };

            let left_id = nodes.len();
            let right_id = left_id + 1;
            nodes.push(TreeNode::Leaf { value: 0.0 });
            nodes.push(TreeNode::Leaf { value: 0.0 });
            nodes[node] = TreeNode::Split {
                feature: split.feature,
                threshold: self.edges[split.feature][split.bin],
                left: left_id,
                right: right_id,
            };
            leaf_count += 1;

            open.push(self.open_leaf(left_id, depth + 1, left, left_histogram, gradients));
            open.push(self.open_leaf(right_id, depth + 1, right, right_histogram, gradients));
        }

        let lambda = self.params.l2_regularization;
        for leaf in &open {
            let value = -leaf.gradient_sum / (leaf.samples.len() as f64 + lambda);
            nodes[leaf.node] = TreeNode::Leaf {
                value: value * self.params.learning_rate,
            };
        }
        (nodes, open)
    }

    fn open_leaf(
        &self,
        node: usize,
        depth: usize,
        samples: Vec<usize>,
        histogram: Histogram,
        gradients: &[f64],
    ) -> OpenLeaf {
        let gradient_sum = samples.iter().map(|&s| gradients[s]).sum();
        let mut leaf = OpenLeaf {
            node,
            depth,
            samples,
            gradient_sum,
            histogram,
            split: None,
        };
        leaf.split = self.find_split(&leaf);
        if leaf.split.is_none() {
            leaf.histogram = Vec::new();
        }
        leaf
    }

    fn histogram(&self, samples: &[usize], gradients: &[f64]) -> Histogram {
        let mut histogram: Histogram = self
            .n_bins
            .iter()
            .map(|&bins| vec![BinStat::default(); bins])
            .collect();
        for &s in samples {
            let row = &self.binned[s * self.n_features..(s + 1) * self.n_features];
            for (feature, &bin) in row.iter().enumerate() {
                let stat = &mut histogram[feature][bin as usize];
                stat.gradient += gradients[s];
                stat.count += 1;
            }
        }
        histogram
    }

    fn find_split(&self, leaf: &OpenLeaf) -> Option<SplitCandidate> {
        let params = self.params;
        let n = leaf.samples.len();
        if params.max_depth.is_some_and(|d| leaf.depth >= d) || n < 2 * params.min_samples_leaf {
            return None;
        }

        let lambda = params.l2_regularization;
        let parent = leaf.gradient_sum * leaf.gradient_sum / (n as f64 + lambda);
        let mut best: Option<SplitCandidate> = None;

        for (feature, bins) in leaf.histogram.iter().enumerate() {
            let mut left_gradient = 0.0;
            let mut left_count = 0usize;
            for (bin, stat) in bins.iter().enumerate().take(bins.len().saturating_sub(1)) {
                left_gradient += stat.gradient;
                left_count += stat.count;
                let right_count = n - left_count;
                if left_count < params.min_samples_leaf {
                    continue;
                }
                if right_count < params.min_samples_leaf {
                    break;
                }

                let right_gradient = leaf.gradient_sum - left_gradient;
                let gain = left_gradient * left_gradient / (left_count as f64 + lambda)
                    + right_gradient * right_gradient / (right_count as f64 + lambda)
                    - parent;
                if gain > 0.0 && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate { feature, bin, gain });
                }
            }
        }

        best
    }
}

/// First leaf with the largest gain
fn best_open_leaf(open: &[OpenLeaf]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, leaf) in open.iter().enumerate() {
        if let Some(split) = leaf.split {
            if best.map_or(true, |(_, gain)| split.gain > gain) {
                best = Some((index, split.gain));
            }
        }
    }
    best.map(|(index, _)| index)
}

fn subtract(parent: &Histogram, child: &Histogram) -> Histogram {
    parent
        .iter()
        .zip(child)
        .map(|(p_bins, c_bins)| {
            p_bins
                .iter()
                .zip(c_bins)
                .map(|(p, c)| BinStat {
                    gradient: p.gradient - c.gradient,
                    count: p.count - c.count,
                })
                .collect()
        })
        .collect()
}
