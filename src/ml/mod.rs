//! In-crate ensemble classifiers and evaluation metrics.
//!
//! Both models are deterministic for a given seed and expose the same
//! [`Classifier`] interface so the pipeline can swap them freely.

pub mod binning;
pub mod boost;
mod classes;
pub mod forest;
pub mod metrics;
pub mod tree;

pub use boost::{BoostOptions, GradientBoosting};
pub use classes::ClassIndex;
pub use forest::{ForestOptions, RandomForest};

use thiserror::Error;

use crate::features::FeatureMatrix;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("Cannot fit on an empty dataset")]
    EmptyDataset,
    #[error("Model has not been fitted")]
    NotFitted,
    #[error("Model was fitted on {expected} features but got {found}")]
    FeatureCountMismatch { expected: usize, found: usize },
    #[error("Feature `{feature}` has non-finite value {value} in row {row}")]
    NonFinite {
        row: usize,
        feature: String,
        value: f32,
    },
}

/// A multi-class classifier trained in place.
pub trait Classifier {
    /// Short model name used in logs.
    fn name(&self) -> &'static str;

    /// Train on `features` with one label per row, replacing any prior fit.
    fn fit(&mut self, features: &FeatureMatrix, labels: &[String]) -> Result<(), ModelError>;

    /// Predict one label per row, in row order.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>, ModelError>;

    /// Trees (forest) or boosting rounds fitted so far, zero before `fit`.
    fn estimator_count(&self) -> usize;

    /// Importance per training feature, summing to `1`, once fitted.
    fn feature_importances(&self) -> Option<Vec<f32>>;
}

/// Shared input checks for `fit`.
pub(crate) fn check_training_input(
    features: &FeatureMatrix,
    labels: &[String],
) -> Result<(), ModelError> {
    if features.n_rows() != labels.len() {
        return Err(ModelError::LengthMismatch {
            rows: features.n_rows(),
            labels: labels.len(),
        });
    }
    if features.n_rows() == 0 || features.n_features() == 0 {
        return Err(ModelError::EmptyDataset);
    }
    check_finite(features)
}

/// Shared input checks for `predict`.
pub(crate) fn check_prediction_input(
    features: &FeatureMatrix,
    expected_features: usize,
) -> Result<(), ModelError> {
    if features.n_features() != expected_features {
        return Err(ModelError::FeatureCountMismatch {
            expected: expected_features,
            found: features.n_features(),
        });
    }
    check_finite(features)
}

fn check_finite(features: &FeatureMatrix) -> Result<(), ModelError> {
    for row in 0..features.n_rows() {
        for (feature, &value) in features.row(row).iter().enumerate() {
            if !value.is_finite() {
                return Err(ModelError::NonFinite {
                    row,
                    feature: features.names()[feature].clone(),
                    value,
                });
            }
        }
    }
    Ok(())
}

/// Scale `values` so they sum to one. All-zero input stays all zero.
pub(crate) fn normalize_in_place(values: &mut [f32]) {
    let total: f32 = values.iter().sum();
    if total > 0.0 {
        for value in values.iter_mut() {
            *value /= total;
        }
    }
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &[f32]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[1.0]), 0);
    }

    #[test]
    fn normalize_sums_to_one() {
        let mut values = vec![1.0, 3.0];
        normalize_in_place(&mut values);
        assert_eq!(values, vec![0.25, 0.75]);
        let mut zeros = vec![0.0, 0.0];
        normalize_in_place(&mut zeros);
        assert_eq!(zeros, vec![0.0, 0.0]);
    }

    #[test]
    fn training_checks_reject_bad_input() {
        let names = vec!["a".to_string()];
        let matrix = FeatureMatrix::from_rows(names.clone(), &[vec![1.0]]).unwrap();
        let err = check_training_input(&matrix, &[]).unwrap_err();
        assert!(matches!(err, ModelError::LengthMismatch { rows: 1, labels: 0 }));

        let infinite = FeatureMatrix::from_rows(names, &[vec![f32::INFINITY]]).unwrap();
        let err = check_training_input(&infinite, &["A".to_string()]).unwrap_err();
        assert!(matches!(err, ModelError::NonFinite { row: 0, .. }));
    }
}
