//! Random forest of fully grown CART trees.
//!
//! Each tree is fit on a bootstrap sample and considers a random subset of
//! features at every split. Leaves store class distributions; prediction
//! averages them across trees.

mod train;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::tree::Tree;
use super::{
    ClassIndex, Classifier, ModelError, argmax, check_prediction_input, check_training_input,
};
use crate::features::FeatureMatrix;

/// Random forest hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestOptions {
    /// Number of trees.
    pub n_trees: usize,
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` uses `sqrt(n_features)`.
    pub max_features: Option<usize>,
    /// Draw a bootstrap sample per tree.
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestOptions {
    /// Clamp values that would make training degenerate.
    pub fn normalized(mut self) -> Self {
        self.n_trees = self.n_trees.max(1);
        self.min_samples_split = self.min_samples_split.max(2);
        self.min_samples_leaf = self.min_samples_leaf.max(1);
        self.max_features = self.max_features.map(|count| count.max(1));
        self
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        let count = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize);
        count.clamp(1, n_features.max(1))
    }
}

/// Random forest classifier.
#[derive(Debug, Clone, Default)]
pub struct RandomForest {
    options: ForestOptions,
    fitted: Option<FittedForest>,
}

#[derive(Debug, Clone)]
struct FittedForest {
    classes: ClassIndex,
    n_features: usize,
    trees: Vec<Tree<Vec<f32>>>,
    importances: Vec<f32>,
}

impl RandomForest {
    pub fn new(options: ForestOptions) -> Self {
        Self {
            options: options.normalized(),
            fitted: None,
        }
    }

    /// Averaged class probabilities per row, columns ordered like `classes`.
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f32>>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_prediction_input(features, fitted.n_features)?;
        let n_classes = fitted.classes.len();
        let mut out = Vec::with_capacity(features.n_rows());
        for row in 0..features.n_rows() {
            let mut proba = vec![0.0f32; n_classes];
            for tree in &fitted.trees {
                if let Some(leaf) = tree.leaf(features.row(row)) {
                    for (acc, p) in proba.iter_mut().zip(leaf) {
                        *acc += p;
                    }
                }
            }
            let scale = fitted.trees.len().max(1) as f32;
            proba.iter_mut().for_each(|p| *p /= scale);
            out.push(proba);
        }
        Ok(out)
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "random forest"
    }

    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<(), ModelError> {
        check_training_input(features, labels)?;
        let classes = ClassIndex::from_labels(labels);
        let targets = classes.encode(labels);
        let per_split = self.options.features_per_split(features.n_features());
        info!(
            "Fitting random forest: {} trees, {} rows, {} features ({per_split} per split), {} classes",
            self.options.n_trees,
            features.n_rows(),
            features.n_features(),
            classes.len()
        );

        let mut trees = Vec::with_capacity(self.options.n_trees);
        let mut importances = vec![0.0f32; features.n_features()];
        for tree_idx in 0..self.options.n_trees {
            let grown = train::grow_tree(
                features,
                &targets,
                classes.len(),
                per_split,
                &self.options,
                self.options.seed.wrapping_add(tree_idx as u64),
            );
            for (total, value) in importances.iter_mut().zip(&grown.importances) {
                *total += value;
            }
            debug!(
                "Tree {}/{}: {} nodes",
                tree_idx + 1,
                self.options.n_trees,
                grown.tree.len()
            );
            trees.push(grown.tree);
        }
        super::normalize_in_place(&mut importances);

        self.fitted = Some(FittedForest {
            classes,
            n_features: features.n_features(),
            trees,
            importances,
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
        self.fitted.as_ref().map_or(0, |fitted| fitted.trees.len())
    }

    fn feature_importances(&self) -> Option<Vec<f32>> {
        self.fitted.as_ref().map(|fitted| fitted.importances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn separable() -> (FeatureMatrix, Vec<String>) {
        let rows: Vec<Vec<f32>> = (0..40)
            .map(|i| vec![i as f32, ((i * 7) % 5) as f32])
            .collect();
        let y: Vec<String> = (0..40)
            .map(|i| if i < 20 { "low" } else { "high" }.to_string())
            .collect();
        let matrix =
            FeatureMatrix::from_rows(vec!["signal".into(), "noise".into()], &rows).unwrap();
        (matrix, y)
    }

    #[test]
    fn predict_before_fit_fails() {
        let forest = RandomForest::default();
        let (x, _) = separable();
        assert!(matches!(forest.predict(&x), Err(ModelError::NotFitted)));
        assert!(forest.feature_importances().is_none());
    }

    #[test]
    fn learns_a_separable_problem() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(ForestOptions {
            n_trees: 20,
            ..ForestOptions::default()
        });
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.estimator_count(), 20);
        let predicted = forest.predict(&x).unwrap();
        assert_eq!(predicted, y);

        let importances = forest.feature_importances().unwrap();
        assert!((importances.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn single_class_predicts_that_class() {
        let x = FeatureMatrix::from_rows(vec!["f".into()], &[vec![1.0], vec![2.0]]).unwrap();
        let y = labels(&["A", "A"]);
        let mut forest = RandomForest::new(ForestOptions {
            n_trees: 3,
            ..ForestOptions::default()
        });
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.predict(&x).unwrap(), y);
    }

    #[test]
    fn fitting_is_deterministic_for_a_seed() {
        let (x, y) = separable();
        let options = ForestOptions {
            n_trees: 5,
            ..ForestOptions::default()
        };
        let mut first = RandomForest::new(options.clone());
        let mut second = RandomForest::new(options);
        first.fit(&x, &y).unwrap();
        second.fit(&x, &y).unwrap();
        assert_eq!(
            first.predict_proba(&x).unwrap(),
            second.predict_proba(&x).unwrap()
        );
    }

    #[test]
    fn rejects_wrong_feature_count() {
        let (x, y) = separable();
        let mut forest = RandomForest::new(ForestOptions {
            n_trees: 2,
            ..ForestOptions::default()
        });
        forest.fit(&x, &y).unwrap();
        let narrow = FeatureMatrix::from_rows(vec!["signal".into()], &[vec![1.0]]).unwrap();
        assert!(matches!(
            forest.predict(&narrow),
            Err(ModelError::FeatureCountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn options_are_normalized() {
        let options = ForestOptions {
            n_trees: 0,
            min_samples_split: 0,
            min_samples_leaf: 0,
            max_features: Some(0),
            ..ForestOptions::default()
        }
        .normalized();
        assert_eq!(options.n_trees, 1);
        assert_eq!(options.min_samples_split, 2);
        assert_eq!(options.min_samples_leaf, 1);
        assert_eq!(options.max_features, Some(1));
        assert_eq!(ForestOptions::default().features_per_split(10), 3);
    }
}
