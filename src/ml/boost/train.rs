use tracing::debug;

use super::{BoostOptions, softmax};
use crate::features::FeatureMatrix;
use crate::ml::binning::{BinnedMatrix, FeatureBins};
use crate::ml::normalize_in_place;
use crate::ml::tree::{Node, Tree};

/// Smallest loss reduction accepted as a split.
const MIN_SPLIT_GAIN: f64 = 1e-6;
/// Floor for per-sample hessians so confident rows keep a nonzero weight.
const MIN_HESSIAN: f32 = 1e-6;

pub(super) struct Trained {
    pub init_raw: Vec<f32>,
    pub rounds: Vec<Vec<Tree<f32>>>,
    /// Average split gain per feature, normalized to sum to one.
    pub importances: Vec<f32>,
}

/// Gradient/hessian pair for one class in the current round.
struct Targets<'a> {
    grad: &'a [f32],
    hess: &'a [f32],
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct Split {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct GainLedger {
    totals: Vec<f64>,
    counts: Vec<usize>,
}

impl GainLedger {
    fn new(n_features: usize) -> Self {
        Self {
            totals: vec![0.0; n_features],
            counts: vec![0; n_features],
        }
    }

    fn record(&mut self, feature: usize, gain: f64) {
        self.totals[feature] += gain;
        self.counts[feature] += 1;
    }

    fn average_gains(&self) -> Vec<f32> {
        let mut averages: Vec<f32> = self
            .totals
            .iter()
            .zip(&self.counts)
            .map(|(&total, &count)| {
                if count == 0 {
                    0.0
                } else {
                    (total / count as f64) as f32
                }
            })
            .collect();
        normalize_in_place(&mut averages);
        averages
    }
}

/// Softmax gradient boosting over histogram-binned features.
pub(super) fn train(
    features: &FeatureMatrix,
    targets: &[usize],
    n_classes: usize,
    options: &BoostOptions,
) -> Trained {
    let n = features.n_rows();
    let bins = FeatureBins::fit(features, options.max_bins);
    let binned = bins.bin_matrix(features);

    let init_raw: Vec<f32> = class_priors(targets, n_classes)
        .iter()
        .map(|&p| p.max(1e-6).ln())
        .collect();
    let mut raw = vec![init_raw.clone(); n];
    let mut ledger = GainLedger::new(features.n_features());
    let mut grad = vec![0.0f32; n];
    let mut hess = vec![0.0f32; n];

    let mut rounds = Vec::with_capacity(options.rounds);
    for round in 0..options.rounds {
        let probs: Vec<Vec<f32>> = raw.iter().map(|r| softmax(r)).collect();
        let mut trees = Vec::with_capacity(n_classes);
        for class in 0..n_classes {
            for i in 0..n {
                let p = probs[i][class];
                let y = if targets[i] == class { 1.0 } else { 0.0 };
                grad[i] = p - y;
                hess[i] = (2.0 * p * (1.0 - p)).max(MIN_HESSIAN);
            }
            let tree = grow_tree(
                &bins,
                &binned,
                &Targets {
                    grad: &grad,
                    hess: &hess,
                },
                options,
                &mut ledger,
            );
            for (i, scores) in raw.iter_mut().enumerate() {
                if let Some(weight) = tree.leaf(features.row(i)) {
                    scores[class] += weight;
                }
            }
            trees.push(tree);
        }
        rounds.push(trees);
        if (round + 1) % 50 == 0 {
            debug!("Completed boosting round {}/{}", round + 1, options.rounds);
        }
    }

    Trained {
        init_raw,
        rounds,
        importances: ledger.average_gains(),
    }
}

fn class_priors(targets: &[usize], n_classes: usize) -> Vec<f32> {
    let mut counts = vec![0usize; n_classes];
    for &label in targets {
        counts[label] += 1;
    }
    let total = targets.len().max(1) as f32;
    counts.into_iter().map(|c| c as f32 / total).collect()
}

fn grow_tree(
    bins: &FeatureBins,
    binned: &BinnedMatrix,
    targets: &Targets<'_>,
    options: &BoostOptions,
    ledger: &mut GainLedger,
) -> Tree<f32> {
    let mut tree = Tree::new();
    let root = tree.push(Node::Leaf(0.0));
    let mut stack = vec![Pending {
        node: root,
        samples: (0..targets.grad.len()).collect(),
        depth: 0,
    }];

    while let Some(Pending {
        node,
        samples,
        depth,
    }) = stack.pop()
    {
        let (g, h) = sums(&samples, targets);
        let split = if depth < options.max_depth && samples.len() >= 2 {
            best_split(bins, binned, targets, &samples, g, h, options)
        } else {
            None
        };
        let Some(split) = split else {
            tree.set(node, Node::Leaf(leaf_weight(g, h, options)));
            continue;
        };

        ledger.record(split.feature, split.gain);
        let column = &binned.bins[split.feature];
        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&row| column[row] as usize <= split.bin);
        let left = tree.push(Node::Leaf(0.0));
        let right = tree.push(Node::Leaf(0.0));
        tree.set(
            node,
            Node::Split {
                feature: split.feature,
                threshold: bins.threshold(split.feature, split.bin),
                left,
                right,
            },
        );
        stack.push(Pending {
            node: right,
            samples: right_samples,
            depth: depth + 1,
        });
        stack.push(Pending {
            node: left,
            samples: left_samples,
            depth: depth + 1,
        });
    }
    tree
}

fn sums(samples: &[usize], targets: &Targets<'_>) -> (f64, f64) {
    samples.iter().fold((0.0, 0.0), |(g, h), &row| {
        (g + targets.grad[row] as f64, h + targets.hess[row] as f64)
    })
}

fn leaf_weight(g: f64, h: f64, options: &BoostOptions) -> f32 {
    let weight = -g / (h + options.lambda as f64);
    (weight * options.learning_rate as f64) as f32
}

fn best_split(
    bins: &FeatureBins,
    binned: &BinnedMatrix,
    targets: &Targets<'_>,
    samples: &[usize],
    g: f64,
    h: f64,
    options: &BoostOptions,
) -> Option<Split> {
    let lambda = options.lambda as f64;
    let min_child_weight = options.min_child_weight as f64;
    let parent_score = g * g / (h + lambda);
    let mut best: Option<Split> = None;
    let mut hist_g: Vec<f64> = Vec::new();
    let mut hist_h: Vec<f64> = Vec::new();
    let mut hist_n: Vec<usize> = Vec::new();

    for (feature, column) in binned.bins.iter().enumerate() {
        let n_bins = bins.n_bins(feature);
        if n_bins < 2 {
            continue;
        }
        hist_g.clear();
        hist_g.resize(n_bins, 0.0);
        hist_h.clear();
        hist_h.resize(n_bins, 0.0);
        hist_n.clear();
        hist_n.resize(n_bins, 0);
        for &row in samples {
            let bin = (column[row] as usize).min(n_bins - 1);
            hist_g[bin] += targets.grad[row] as f64;
            hist_h[bin] += targets.hess[row] as f64;
            hist_n[bin] += 1;
        }

        let mut g_left = 0.0f64;
        let mut h_left = 0.0f64;
        let mut n_left = 0usize;
        for bin in 0..n_bins - 1 {
            g_left += hist_g[bin];
            h_left += hist_h[bin];
            n_left += hist_n[bin];
            if n_left == 0 || n_left == samples.len() {
                continue;
            }
            let g_right = g - g_left;
            let h_right = h - h_left;
            if h_left < min_child_weight || h_right < min_child_weight {
                continue;
            }
            let gain = 0.5
                * (g_left * g_left / (h_left + lambda) + g_right * g_right / (h_right + lambda)
                    - parent_score)
                - options.gamma as f64;
            let threshold_gain = best.as_ref().map_or(MIN_SPLIT_GAIN, |current| current.gain);
            if gain > threshold_gain {
                best = Some(Split { feature, bin, gain });
            }
        }
    }
    best
}
