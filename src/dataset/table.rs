use super::Value;

/// Named column of cells, one per table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Identifier-keyed records stored column-major.
///
/// Every column holds exactly one cell per identifier. The label is never a
/// column of this table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    ids: Vec<String>,
    columns: Vec<Column>,
}

impl FeatureTable {
    /// Build a table, returning `None` when a column length disagrees with `ids`.
    pub fn new(ids: Vec<String>, columns: Vec<Column>) -> Option<Self> {
        if columns.iter().any(|column| column.values.len() != ids.len()) {
            return None;
        }
        Some(Self { ids, columns })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Borrow identifiers alongside mutable columns.
    pub fn split_mut(&mut self) -> (&[String], &mut [Column]) {
        (&self.ids, &mut self.columns)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|column| column.name == name)
    }

    /// Remove and return the named column.
    pub fn take_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|column| column.name == name)?;
        Some(self.columns.remove(idx))
    }

    pub fn retain_columns(&mut self, keep: impl FnMut(&Column) -> bool) {
        self.columns.retain(keep);
    }

    /// Swap in columns previously taken from this table.
    pub(crate) fn replace_columns(&mut self, columns: Vec<Column>) {
        debug_assert!(columns.iter().all(|column| column.values.len() == self.ids.len()));
        self.columns = columns;
    }

    /// Split into identifiers and columns.
    pub fn into_parts(self) -> (Vec<String>, Vec<Column>) {
        (self.ids, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        FeatureTable::new(
            vec!["1".into(), "2".into()],
            vec![
                Column::new("a", vec![Value::Number(1.0), Value::Missing]),
                Column::new("b", vec![Value::Text("x".into()), Value::Number(2.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_columns() {
        let built = FeatureTable::new(
            vec!["1".into()],
            vec![Column::new("a", vec![Value::Missing, Value::Missing])],
        );
        assert!(built.is_none());
    }

    #[test]
    fn take_column_removes_by_name() {
        let mut table = table();
        let taken = table.take_column("a").unwrap();
        assert_eq!(taken.values.len(), 2);
        assert_eq!(table.column_names(), vec!["b"]);
        assert!(table.take_column("a").is_none());
    }
}
