use std::collections::BTreeSet;

use tracing::debug;

use super::FeatureError;
use crate::dataset::{Column, FeatureTable};

/// Remove exactly the `excluded` columns.
///
/// Every excluded name must exist; the table is left untouched otherwise so a
/// schema change fails loudly instead of training on the wrong columns.
pub fn drop_columns<S: AsRef<str>>(
    table: FeatureTable,
    excluded: &[S],
) -> Result<FeatureTable, FeatureError> {
    let excluded: BTreeSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    if let Some(absent) = excluded.iter().find(|name| table.column(name).is_none()) {
        return Err(FeatureError::MissingColumn {
            column: absent.to_string(),
        });
    }
    Ok(retain(table, |name| !excluded.contains(name)))
}

/// Remove whichever `excluded` columns exist.
///
/// Applying this twice with the same list is the same as applying it once.
pub fn drop_columns_lenient<S: AsRef<str>>(table: FeatureTable, excluded: &[S]) -> FeatureTable {
    let excluded: BTreeSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    retain(table, |name| !excluded.contains(name))
}

/// Reorder `table` columns to match `reference`.
///
/// The column sets must be identical.
pub fn align_columns<S: AsRef<str>>(
    mut table: FeatureTable,
    reference: &[S],
) -> Result<FeatureTable, FeatureError> {
    let mut aligned: Vec<Column> = Vec::with_capacity(reference.len());
    for name in reference {
        let name = name.as_ref();
        let column = table
            .take_column(name)
            .ok_or_else(|| FeatureError::MissingColumn {
                column: name.to_string(),
            })?;
        aligned.push(column);
    }
    if let Some(extra) = table.columns().first() {
        return Err(FeatureError::UnexpectedColumn {
            column: extra.name.clone(),
        });
    }
    table.replace_columns(aligned);
    Ok(table)
}

fn retain(mut table: FeatureTable, keep: impl Fn(&str) -> bool) -> FeatureTable {
    let before = table.columns().len();
    table.retain_columns(|column| keep(&column.name));
    debug!("Dropped {} of {} columns", before - table.columns().len(), before);
    table
}
