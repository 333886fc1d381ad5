//! Tabular dataset loading and the in-memory feature table.

pub mod loader;
mod table;
mod value;

pub use loader::{DatasetLoadError, LabeledTable, load_labeled, load_unlabeled};
pub use table::{Column, FeatureTable};
pub use value::{NA_MARKERS, Value};
