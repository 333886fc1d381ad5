use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Ordered set of class labels seen during training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndex {
    classes: Vec<String>,
    lookup: BTreeMap<String, usize>,
}

impl ClassIndex {
    /// Collect the distinct labels in sorted order.
    ///
    /// When every label parses as a number the order is numeric, so `"9"`
    /// precedes `"10"`; otherwise labels sort as strings. Ties between
    /// equally likely classes go to the first class in this order.
    pub fn from_labels(labels: &[String]) -> Self {
        let mut classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let numeric: Option<Vec<f64>> = classes
            .iter()
            .map(|class| class.trim().parse::<f64>().ok())
            .collect();
        if let Some(values) = numeric {
            let mut order: Vec<(f64, String)> = values.into_iter().zip(classes).collect();
            order.sort_by(|a, b| match a.0.total_cmp(&b.0) {
                Ordering::Equal => a.1.cmp(&b.1),
                other => other,
            });
            classes = order.into_iter().map(|(_, class)| class).collect();
        }
        let lookup = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (class.clone(), idx))
            .collect();
        Self { classes, lookup }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.lookup.get(label).copied()
    }

    pub fn label(&self, index: usize) -> &str {
        &self.classes[index]
    }

    /// Encode labels that were used to build this index.
    pub(crate) fn encode(&self, labels: &[String]) -> Vec<usize> {
        labels
            .iter()
            .map(|label| self.lookup[label.as_str()])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_are_sorted_and_unique() {
        let labels: Vec<String> = ["3", "1", "3", "2"].iter().map(|s| s.to_string()).collect();
        let index = ClassIndex::from_labels(&labels);
        assert_eq!(index.len(), 3);
        assert_eq!(index.label(0), "1");
        assert_eq!(index.encode(&labels), vec![2, 0, 2, 1]);
        assert_eq!(index.index_of("4"), None);
        assert_eq!(index.label(1), "2");
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_labels_sort_by_value() {
        let index = ClassIndex::from_labels(&strings(&["10", "9", "2", "10", "1.5"]));
        let order: Vec<&str> = (0..index.len()).map(|idx| index.label(idx)).collect();
        assert_eq!(order, vec!["1.5", "2", "9", "10"]);
        assert_eq!(index.index_of("10"), Some(3));
    }

    #[test]
    fn mixed_labels_sort_as_strings() {
        let index = ClassIndex::from_labels(&strings(&["10", "9", "gold"]));
        let order: Vec<&str> = (0..index.len()).map(|idx| index.label(idx)).collect();
        assert_eq!(order, vec!["10", "9", "gold"]);
    }

    #[test]
    fn ties_go_to_the_smallest_numeric_class() {
        let index = ClassIndex::from_labels(&strings(&["10", "9"]));
        assert_eq!(index.label(crate::ml::argmax(&[0.5, 0.5])), "9");
    }
}
