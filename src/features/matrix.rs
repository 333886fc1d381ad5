use ndarray::{Array2, ArrayView1};

use super::FeatureError;
use crate::dataset::{FeatureTable, Value};

/// Dense numeric features, one row per record in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f32>,
}

impl FeatureMatrix {
    /// Coerce a fully transformed table into a matrix.
    ///
    /// Numbers are narrowed to `f32` and the empty text sentinel becomes `0`.
    /// Any other text, or a cell that was never normalized, is fatal.
    pub fn from_table(table: &FeatureTable) -> Result<Self, FeatureError> {
        let n_rows = table.len();
        let n_cols = table.columns().len();
        let mut values = Array2::<f32>::zeros((n_rows, n_cols));
        for (j, column) in table.columns().iter().enumerate() {
            for (i, (id, value)) in table.ids().iter().zip(&column.values).enumerate() {
                let number = match value {
                    Value::Missing => {
                        return Err(FeatureError::UnnormalizedCell {
                            column: column.name.clone(),
                            id: id.clone(),
                        });
                    }
                    other => other.as_number().ok_or_else(|| FeatureError::NonNumeric {
                        column: column.name.clone(),
                        id: id.clone(),
                        value: other.to_string(),
                    })?,
                };
                values[[i, j]] = number as f32;
            }
        }
        let names = table
            .columns()
            .iter()
            .map(|column| column.name.clone())
            .collect();
        Ok(Self { names, values })
    }

    /// Build a matrix from row vectors. Returns `None` for ragged rows.
    pub fn from_rows(names: Vec<String>, rows: &[Vec<f32>]) -> Option<Self> {
        let width = names.len();
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((rows.len(), width), flat).ok()?;
        Some(Self { names, values })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f32> {
        self.values.row(index)
    }

    pub fn value(&self, row: usize, feature: usize) -> f32 {
        self.values[[row, feature]]
    }

    pub fn column(&self, feature: usize) -> ArrayView1<'_, f32> {
        self.values.column(feature)
    }
}
