//! Evaluation metrics for classification models.

use super::ClassIndex;

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
    /// Pairs that referenced a class outside the index and were not counted.
    pub skipped: u32,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
            skipped: 0,
        }
    }

    /// Tally aligned truth/prediction labels against `classes`.
    ///
    /// Labels unknown to `classes` are counted in [`ConfusionMatrix::skipped`]
    /// rather than silently dropped.
    pub fn from_labels(classes: &ClassIndex, truth: &[String], predicted: &[String]) -> Self {
        let mut cm = Self::new(classes.len());
        for (t, p) in truth.iter().zip(predicted) {
            match (classes.index_of(t), classes.index_of(p)) {
                (Some(t), Some(p)) => {
                    cm.add(t, p);
                }
                _ => cm.skipped = cm.skipped.saturating_add(1),
            }
        }
        cm
    }

    /// Record one pair. Returns `false` when an index is out of range.
    pub fn add(&mut self, truth: usize, predicted: usize) -> bool {
        if truth >= self.n_classes || predicted >= self.n_classes {
            self.skipped = self.skipped.saturating_add(1);
            return false;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
        true
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Harmonic mean of precision and recall.
    pub f1: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    (0..k)
        .map(|class_idx| {
            let tp = cm.get(class_idx, class_idx) as f32;
            let support: u32 = (0..k).map(|j| cm.get(class_idx, j)).sum();
            let predicted: u32 = (0..k).map(|i| cm.get(i, class_idx)).sum();
            let precision = if predicted == 0 {
                0.0
            } else {
                tp / predicted as f32
            };
            let recall = if support == 0 {
                0.0
            } else {
                tp / support as f32
            };
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            PerClassStats {
                precision,
                recall,
                f1,
                support,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn tallies_labels_and_reports_unknowns() {
        let classes = ClassIndex::from_labels(&strings(&["a", "b"]));
        let cm = ConfusionMatrix::from_labels(
            &classes,
            &strings(&["a", "a", "b", "b"]),
            &strings(&["a", "b", "b", "zzz"]),
        );
        assert_eq!(cm.get(0, 0), 1);
        assert_eq!(cm.get(0, 1), 1);
        assert_eq!(cm.get(1, 1), 1);
        assert_eq!(cm.skipped, 1);
        assert_eq!(cm.counts.iter().sum::<u32>(), 3);
    }

    #[test]
    fn per_class_stats() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(0, 0);
        cm.add(0, 0);
        cm.add(0, 1);
        cm.add(1, 1);
        assert!(!cm.add(2, 0));
        let stats = precision_recall_by_class(&cm);
        assert_eq!(stats[0].support, 3);
        assert!((stats[0].precision - 1.0).abs() < 1e-6);
        assert!((stats[0].recall - 2.0 / 3.0).abs() < 1e-6);
        assert!((stats[1].precision - 0.5).abs() < 1e-6);
        assert!((stats[1].f1 - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn empty_matrix_has_zero_stats() {
        let stats = precision_recall_by_class(&ConfusionMatrix::new(3));
        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.precision == 0.0 && s.recall == 0.0 && s.support == 0));
    }
}
