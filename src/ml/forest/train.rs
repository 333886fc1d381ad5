use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::ForestOptions;
use crate::features::FeatureMatrix;
use crate::ml::normalize_in_place;
use crate::ml::tree::{Node, Tree};

/// One fitted tree with its normalized impurity-decrease importances.
pub(super) struct GrownTree {
    pub tree: Tree<Vec<f32>>,
    pub importances: Vec<f32>,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct Split {
    feature: usize,
    threshold: f32,
    /// Sample-weighted Gini impurity of the two children.
    child_impurity: f32,
}

/// Grow one CART tree on a bootstrap sample of the rows.
pub(super) fn grow_tree(
    features: &FeatureMatrix,
    targets: &[usize],
    n_classes: usize,
    per_split: usize,
    options: &ForestOptions,
    seed: u64,
) -> GrownTree {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_rows = features.n_rows();
    let samples: Vec<usize> = if options.bootstrap {
        (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect()
    } else {
        (0..n_rows).collect()
    };
    let total = samples.len() as f32;

    let mut tree = Tree::new();
    let mut importances = vec![0.0f32; features.n_features()];
    let mut feature_order: Vec<usize> = (0..features.n_features()).collect();
    let root = tree.push(Node::Leaf(Vec::new()));
    let mut stack = vec![Pending {
        node: root,
        samples,
        depth: 0,
    }];

    while let Some(Pending {
        node,
        samples,
        depth,
    }) = stack.pop()
    {
        let counts = class_counts(&samples, targets, n_classes);
        let impurity = gini(&counts, samples.len());
        let splittable = impurity > 0.0
            && samples.len() >= options.min_samples_split
            && samples.len() >= 2 * options.min_samples_leaf
            && options.max_depth.is_none_or(|max| depth < max);
        let split = if splittable {
            feature_order.shuffle(&mut rng);
            best_split(
                features,
                targets,
                &counts,
                &samples,
                &feature_order,
                per_split,
                options.min_samples_leaf,
            )
        } else {
            None
        };

        let Some(split) = split else {
            tree.set(node, Node::Leaf(distribution(&counts)));
            continue;
        };
        importances[split.feature] +=
            (samples.len() as f32 / total) * (impurity - split.child_impurity);
        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&row| features.value(row, split.feature) <= split.threshold);
        let left = tree.push(Node::Leaf(Vec::new()));
        let right = tree.push(Node::Leaf(Vec::new()));
        tree.set(
            node,
            Node::Split {
                feature: split.feature,
                threshold: split.threshold,
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

    normalize_in_place(&mut importances);
    GrownTree { tree, importances }
}

/// Search features in `feature_order` for the lowest child impurity.
///
/// At least `per_split` non-constant features are examined; the search keeps
/// going past that only while no valid split has been found.
fn best_split(
    features: &FeatureMatrix,
    targets: &[usize],
    counts: &[usize],
    samples: &[usize],
    feature_order: &[usize],
    per_split: usize,
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = samples.len();
    let mut best: Option<Split> = None;
    let mut visited = 0usize;
    let mut sorted: Vec<(f32, usize)> = Vec::with_capacity(n);

    for &feature in feature_order {
        if visited >= per_split && best.is_some() {
            break;
        }
        sorted.clear();
        sorted.extend(
            samples
                .iter()
                .map(|&row| (features.value(row, feature), targets[row])),
        );
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            continue;
        };
        if first.0 >= last.0 {
            continue;
        }
        visited += 1;

        let mut left = vec![0usize; counts.len()];
        let mut right = counts.to_vec();
        for i in 0..n - 1 {
            let (value, class) = sorted[i];
            left[class] += 1;
            right[class] -= 1;
            let next = sorted[i + 1].0;
            if value >= next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }
            let weighted = (n_left as f32 * gini(&left, n_left)
                + n_right as f32 * gini(&right, n_right))
                / n as f32;
            if best
                .as_ref()
                .is_none_or(|current| weighted < current.child_impurity)
            {
                let midpoint = value + (next - value) / 2.0;
                let threshold = if midpoint < next { midpoint } else { value };
                best = Some(Split {
                    feature,
                    threshold,
                    child_impurity: weighted,
                });
            }
        }
    }
    best
}

fn class_counts(samples: &[usize], targets: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &row in samples {
        counts[targets[row]] += 1;
    }
    counts
}

fn gini(counts: &[usize], total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f32;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f32 / total;
            p * p
        })
        .sum::<f32>()
}

fn distribution(counts: &[usize]) -> Vec<f32> {
    let mut proba: Vec<f32> = counts.iter().map(|&c| c as f32).collect();
    normalize_in_place(&mut proba);
    proba
}
