//! Deterministic feature transforms applied between loading and fitting.
//!
//! The transforms run in a fixed order: [`drop_columns`], [`fill_missing`],
//! [`aggregate_columns`] and, for the boosted pipeline, [`apply_skew_correction`].
//! [`FeatureMatrix::from_table`] then coerces the result into a dense numeric
//! matrix.

mod aggregate;
mod filter;
mod matrix;
mod normalize;
mod skew;

pub use aggregate::{aggregate_columns, count_tokens};
pub use filter::{align_columns, drop_columns, drop_columns_lenient};
pub use matrix::FeatureMatrix;
pub use normalize::fill_missing;
pub use skew::{apply_skew_correction, log_transform};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Column `{column}` is not present in the table")]
    MissingColumn { column: String },
    #[error("Column `{column}` has a missing cell for `{id}`; fill missing values first")]
    UnnormalizedCell { column: String, id: String },
    #[error("Column `{column}` has non-numeric value `{value}` for `{id}`")]
    NonNumeric {
        column: String,
        id: String,
        value: String,
    },
    #[error("Unexpected column `{column}` not present in the reference table")]
    UnexpectedColumn { column: String },
}
