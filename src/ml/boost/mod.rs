//! Gradient-boosted regression trees for multi-class classification.
//!
//! Every round fits one tree per class to the softmax gradient and hessian,
//! searching splits over quantile histograms. Leaves hold learning-rate scaled
//! weights added to the raw class scores.

mod train;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::tree::Tree;
use super::{
    ClassIndex, Classifier, ModelError, argmax, check_prediction_input, check_training_input,
};
use crate::features::FeatureMatrix;

/// Boosting hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostOptions {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Maximum depth of each tree.
    pub max_depth: usize,
    /// Shrinkage applied to every leaf weight.
    pub learning_rate: f32,
    /// L2 regularization on leaf weights.
    pub lambda: f32,
    /// Minimum loss reduction required to split.
    pub gamma: f32,
    /// Minimum hessian sum in each child.
    pub min_child_weight: f32,
    /// Maximum histogram bins per feature.
    pub max_bins: usize,
}

impl Default for BoostOptions {
    fn default() -> Self {
        Self {
            rounds: 400,
            max_depth: 6,
            learning_rate: 0.3,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 1.0,
            max_bins: 256,
        }
    }
}

impl BoostOptions {
    /// Clamp values that would make training degenerate.
    pub fn normalized(mut self) -> Self {
        self.rounds = self.rounds.max(1);
        self.max_depth = self.max_depth.max(1);
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            self.learning_rate = Self::default().learning_rate;
        }
        self.lambda = self.lambda.max(0.0);
        self.gamma = self.gamma.max(0.0);
        self.min_child_weight = self.min_child_weight.max(0.0);
        self.max_bins = self.max_bins.clamp(2, 1024);
        self
    }
}

/// Gradient-boosted tree classifier.
#[derive(Debug, Clone, Default)]
pub struct GradientBoosting {
    options: BoostOptions,
    fitted: Option<FittedBoost>,
}

#[derive(Debug, Clone)]
struct FittedBoost {
    classes: ClassIndex,
    n_features: usize,
    init_raw: Vec<f32>,
    /// Shape: `[n_rounds][n_classes]`.
    rounds: Vec<Vec<Tree<f32>>>,
    importances: Vec<f32>,
}

impl FittedBoost {
    fn predict_raw(&self, features: &FeatureMatrix, row: usize) -> Vec<f32> {
        let mut raw = self.init_raw.clone();
        for round in &self.rounds {
            for (score, tree) in raw.iter_mut().zip(round) {
                if let Some(weight) = tree.leaf(features.row(row)) {
                    *score += weight;
                }
            }
        }
        raw
    }
}

impl GradientBoosting {
    pub fn new(options: BoostOptions) -> Self {
        Self {
            options: options.normalized(),
            fitted: None,
        }
    }

    /// Class probabilities per row, columns ordered like the sorted classes.
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f32>>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_prediction_input(features, fitted.n_features)?;
        Ok((0..features.n_rows())
            .map(|row| softmax(&fitted.predict_raw(features, row)))
            .collect())
    }
}

impl Classifier for GradientBoosting {
    fn name(&self) -> &'static str {
        "gradient boosting"
    }

    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<(), ModelError> {
        check_training_input(features, labels)?;
        let classes = ClassIndex::from_labels(labels);
        let targets = classes.encode(labels);
        info!(
            "Fitting gradient boosting: {} rounds, depth {}, {} rows, {} features, {} classes",
            self.options.rounds,
            self.options.max_depth,
            features.n_rows(),
            features.n_features(),
            classes.len()
        );
        let trained = train::train(features, &targets, classes.len(), &self.options);
        self.fitted = Some(FittedBoost {
            classes,
            n_features: features.n_features(),
            init_raw: trained.init_raw,
            rounds: trained.rounds,
            importances: trained.importances,
        });
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        let proba = self.predict_proba(features)?;
        Ok(proba
            .iter()
            .map(|row| fitted.classes.label(argmax(row)).to_string())
            .collect())
    }

    fn estimator_count(&self) -> usize {
        self.fitted.as_ref().map_or(0, |fitted| fitted.rounds.len())
    }

    fn feature_importances(&self) -> Option<Vec<f32>> {
        self.fitted.as_ref().map(|fitted| fitted.importances.clone())
    }
}

/// Compute a numerically-stable softmax for a set of logits.
pub fn softmax(raw: &[f32]) -> Vec<f32> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, |a, b| a.max(b));
    let mut exps: Vec<f32> = raw.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum == 0.0 {
        return vec![1.0 / raw.len() as f32; raw.len()];
    }
    for v in &mut exps {
        *v /= sum;
    }
    exps
}
