use tracing::debug;

use super::FeatureError;
use crate::dataset::{FeatureTable, Value};

/// Signed log transform `sign(x) * ln(|x| + 1)`.
///
/// Defined for zero and negative inputs, odd, and monotonically
/// non-decreasing. NaN passes through unchanged.
pub fn log_transform(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() {
        return x;
    }
    x.signum() * x.abs().ln_1p()
}

/// Apply [`log_transform`] to every cell of every column.
///
/// The empty text sentinel becomes `0`. Any other text is rejected. The
/// transform carries no fitted state, so train and test tables are corrected
/// independently with the same result as a joint pass.
pub fn apply_skew_correction(mut table: FeatureTable) -> Result<FeatureTable, FeatureError> {
    let (ids, columns) = table.split_mut();
    for column in columns.iter_mut() {
        for (id, value) in ids.iter().zip(column.values.iter_mut()) {
            let number = match value.as_number() {
                Some(number) => number,
                None if value.is_missing() => {
                    return Err(FeatureError::UnnormalizedCell {
                        column: column.name.clone(),
                        id: id.clone(),
                    });
                }
                None => {
                    return Err(FeatureError::NonNumeric {
                        column: column.name.clone(),
                        id: id.clone(),
                        value: value.to_string(),
                    });
                }
            };
            *value = Value::Number(log_transform(number));
        }
    }
    debug!("Applied signed log transform to {} columns", columns.len());
    Ok(table)
}
