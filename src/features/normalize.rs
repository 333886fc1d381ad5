use tracing::debug;

use crate::dataset::{FeatureTable, Value};

/// Replace every missing cell with the empty text sentinel.
///
/// Runs over all columns, numeric ones included. Count aggregation reads the
/// sentinel as "no items" and the numeric coercions read it as `0`.
pub fn fill_missing(mut table: FeatureTable) -> FeatureTable {
    let mut filled = 0usize;
    for column in table.columns_mut() {
        for value in column.values.iter_mut().filter(|value| value.is_missing()) {
            *value = Value::Text(String::new());
            filled += 1;
        }
    }
    debug!("Filled {filled} missing cells");
    table
}
