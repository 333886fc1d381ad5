//! Quantile binning used by histogram split search.

use tracing::debug;

use crate::features::FeatureMatrix;

/// Per-feature ascending cut points.
///
/// A value falls into bin `b` when it is greater than `cuts[b - 1]` and at most
/// `cuts[b]`, so splitting after bin `b` is the threshold `value <= cuts[b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBins {
    cuts: Vec<Vec<f32>>,
}

/// Bin index of every training value, stored per feature.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    /// Shape: `[n_features][n_rows]`.
    pub bins: Vec<Vec<u16>>,
}

impl FeatureBins {
    /// Compute at most `max_bins` cut points per feature from training data.
    ///
    /// Features with few distinct values get one bin per value; the rest are
    /// cut at evenly spaced quantiles.
    pub fn fit(features: &FeatureMatrix, max_bins: usize) -> Self {
        let max_bins = max_bins.clamp(2, u16::MAX as usize);
        let cuts: Vec<Vec<f32>> = (0..features.n_features())
            .map(|feature| {
                let mut values = features.column(feature).to_vec();
                values.sort_by(f32::total_cmp);
                quantile_cuts(&values, max_bins)
            })
            .collect();
        debug!(
            "Binned {} features into at most {max_bins} bins",
            cuts.len()
        );
        Self { cuts }
    }

    pub fn n_features(&self) -> usize {
        self.cuts.len()
    }

    /// Number of bins for `feature`.
    pub fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len()
    }

    /// Threshold that separates bins `..=bin` from the rest.
    pub fn threshold(&self, feature: usize, bin: usize) -> f32 {
        self.cuts[feature][bin]
    }

    /// Bin index for `value`. Values above the last cut map past the end.
    pub fn bin(&self, feature: usize, value: f32) -> usize {
        self.cuts[feature].partition_point(|cut| *cut < value)
    }

    /// Bin every value of the matrix the bins were fitted on.
    pub fn bin_matrix(&self, features: &FeatureMatrix) -> BinnedMatrix {
        let bins = (0..self.n_features())
            .map(|feature| {
                features
                    .column(feature)
                    .iter()
                    .map(|&value| self.bin(feature, value).min(u16::MAX as usize) as u16)
                    .collect()
            })
            .collect();
        BinnedMatrix { bins }
    }
}

fn quantile_cuts(sorted: &[f32], max_bins: usize) -> Vec<f32> {
    let mut cuts = Vec::with_capacity(max_bins.min(sorted.len()));
    let n = sorted.len();
    for k in 1..=max_bins {
        let pos = (k * n).div_ceil(max_bins);
        if pos == 0 {
            continue;
        }
        let cut = sorted[pos - 1];
        if cuts.last().is_none_or(|last| *last < cut) {
            cuts.push(cut);
        }
    }
    cuts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(column: &[f32]) -> FeatureMatrix {
        let rows: Vec<Vec<f32>> = column.iter().map(|v| vec![*v]).collect();
        FeatureMatrix::from_rows(vec!["f".to_string()], &rows).unwrap()
    }

    #[test]
    fn few_distinct_values_get_own_bins() {
        let bins = FeatureBins::fit(&matrix(&[3.0, 1.0, 2.0, 1.0, 3.0]), 256);
        assert_eq!(bins.n_bins(0), 3);
        assert_eq!(bins.bin(0, 1.0), 0);
        assert_eq!(bins.bin(0, 2.0), 1);
        assert_eq!(bins.bin(0, 3.0), 2);
        assert_eq!(bins.bin(0, 1.5), 1);
        assert_eq!(bins.threshold(0, 0), 1.0);
    }

    #[test]
    fn many_values_are_capped() {
        let values: Vec<f32> = (0..1000).map(|v| v as f32).collect();
        let bins = FeatureBins::fit(&matrix(&values), 16);
        assert_eq!(bins.n_bins(0), 16);
        assert_eq!(bins.threshold(0, 15), 999.0);
        let binned = bins.bin_matrix(&matrix(&values));
        assert!(binned.bins[0].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*binned.bins[0].last().unwrap(), 15);
    }

    #[test]
    fn thresholds_match_bin_boundaries() {
        let values: Vec<f32> = (0..100).map(|v| (v % 37) as f32 * 0.5).collect();
        let bins = FeatureBins::fit(&matrix(&values), 8);
        for &value in &values {
            let bin = bins.bin(0, value);
            assert!(value <= bins.threshold(0, bin));
            if bin > 0 {
                assert!(value > bins.threshold(0, bin - 1));
            }
        }
    }
}
