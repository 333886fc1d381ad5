use tracing::debug;

use super::FeatureError;
use crate::dataset::{FeatureTable, Value};

/// Separator between items of a list-valued field.
pub const LIST_SEPARATOR: char = ';';

/// Number of items in a `;`-separated list. The empty string holds none.
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        0
    } else {
        text.matches(LIST_SEPARATOR).count() + 1
    }
}

/// Replace each cell of the named list columns with its item count.
///
/// Missing cells are rejected: [`super::fill_missing`] must run first.
pub fn aggregate_columns<S: AsRef<str>>(
    mut table: FeatureTable,
    names: &[S],
) -> Result<FeatureTable, FeatureError> {
    for name in names {
        let name = name.as_ref();
        let (ids, columns) = table.split_mut();
        let column = columns
            .iter_mut()
            .find(|column| column.name == name)
            .ok_or_else(|| FeatureError::MissingColumn {
                column: name.to_string(),
            })?;
        for (id, value) in ids.iter().zip(column.values.iter_mut()) {
            let count = match value {
                Value::Text(text) => count_tokens(text),
                Value::Number(_) => 1,
                Value::Missing => {
                    return Err(FeatureError::UnnormalizedCell {
                        column: name.to_string(),
                        id: id.clone(),
                    });
                }
            };
            *value = Value::Number(count as f64);
        }
        debug!("Aggregated list column `{name}` into item counts");
    }
    Ok(table)
}
