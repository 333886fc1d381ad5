//! CSV loader for the train and test tables.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Column, FeatureTable, Value};

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed CSV in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("{path} has no identifier column `{column}`")]
    MissingIdColumn { path: PathBuf, column: String },
    #[error("{path} has no label column `{column}`")]
    MissingLabelColumn { path: PathBuf, column: String },
    #[error("{path} declares column `{column}` more than once")]
    DuplicateColumn { path: PathBuf, column: String },
    #[error("{path} line {line}: empty identifier")]
    EmptyId { path: PathBuf, line: u64 },
    #[error("{path}: identifier `{id}` is not unique")]
    DuplicateId { path: PathBuf, id: String },
    #[error("{path}: record `{id}` has no label")]
    MissingLabel { path: PathBuf, id: String },
}

/// Training table with its label column split off.
#[derive(Debug, Clone)]
pub struct LabeledTable {
    pub features: FeatureTable,
    /// Labels aligned with `features.ids()`.
    pub labels: Vec<String>,
}

/// Load a labeled table indexed by `id_column`.
pub fn load_labeled(
    path: &Path,
    id_column: &str,
    label_column: &str,
) -> Result<LabeledTable, DatasetLoadError> {
    let file = open(path)?;
    read_labeled(file, path, id_column, label_column)
}

/// Load an unlabeled table indexed by `id_column`.
///
/// A stray `label_column` is excluded from the features.
pub fn load_unlabeled(
    path: &Path,
    id_column: &str,
    label_column: &str,
) -> Result<FeatureTable, DatasetLoadError> {
    let file = open(path)?;
    read_unlabeled(file, path, id_column, label_column)
}

fn open(path: &Path) -> Result<BufReader<File>, DatasetLoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| DatasetLoadError::Open {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn read_labeled<R: Read>(
    reader: R,
    path: &Path,
    id_column: &str,
    label_column: &str,
) -> Result<LabeledTable, DatasetLoadError> {
    let mut features = read_table(reader, path, id_column, Some(label_column))?;
    let label = features
        .take_column(label_column)
        .ok_or_else(|| DatasetLoadError::MissingLabelColumn {
            path: path.to_path_buf(),
            column: label_column.to_string(),
        })?;
    let mut labels = Vec::with_capacity(label.values.len());
    for (id, value) in features.ids().iter().zip(label.values) {
        let text = match value {
            Value::Missing => {
                return Err(DatasetLoadError::MissingLabel {
                    path: path.to_path_buf(),
                    id: id.clone(),
                });
            }
            Value::Text(text) => text,
            Value::Number(number) => number.to_string(),
        };
        labels.push(text);
    }
    info!(
        "Loaded {} labeled records with {} columns from {}",
        features.len(),
        features.columns().len(),
        path.display()
    );
    Ok(LabeledTable { features, labels })
}

pub(crate) fn read_unlabeled<R: Read>(
    reader: R,
    path: &Path,
    id_column: &str,
    label_column: &str,
) -> Result<FeatureTable, DatasetLoadError> {
    let mut features = read_table(reader, path, id_column, None)?;
    if features.take_column(label_column).is_some() {
        warn!(
            "Ignoring `{label_column}` column in unlabeled table {}",
            path.display()
        );
    }
    info!(
        "Loaded {} unlabeled records with {} columns from {}",
        features.len(),
        features.columns().len(),
        path.display()
    );
    Ok(features)
}

/// Read a CSV table indexed by `id_column`. The optional `text_column` is
/// kept as trimmed text instead of being parsed as a number.
fn read_table<R: Read>(
    reader: R,
    path: &Path,
    id_column: &str,
    text_column: Option<&str>,
) -> Result<FeatureTable, DatasetLoadError> {
    let csv_error = |source: csv::Error| DatasetLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut seen_headers = HashSet::new();
    for header in headers.iter() {
        if !seen_headers.insert(header) {
            return Err(DatasetLoadError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.to_string(),
            });
        }
    }
    let id_idx = headers
        .iter()
        .position(|header| header == id_column)
        .ok_or_else(|| DatasetLoadError::MissingIdColumn {
            path: path.to_path_buf(),
            column: id_column.to_string(),
        })?;
    let text_idx = text_column.and_then(|name| headers.iter().position(|header| header == name));

    let mut ids = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let id = record.get(id_idx).unwrap_or_default().trim().to_string();
        if id.is_empty() {
            return Err(DatasetLoadError::EmptyId {
                path: path.to_path_buf(),
                line,
            });
        }
        if !seen_ids.insert(id.clone()) {
            return Err(DatasetLoadError::DuplicateId {
                path: path.to_path_buf(),
                id,
            });
        }
        for (idx, field) in record.iter().enumerate() {
            if idx == id_idx {
                continue;
            }
            let value = if Some(idx) == text_idx {
                Value::parse_text(field)
            } else {
                Value::parse(field)
            };
            cells[idx].push(value);
        }
        ids.push(id);
    }
    debug!("Read {} records from {}", ids.len(), path.display());

    let columns = headers
        .iter()
        .zip(cells)
        .enumerate()
        .filter(|(idx, _)| *idx != id_idx)
        .map(|(_, (name, values))| Column::new(name, values))
        .collect();
    // Every record has the header width, so columns always match `ids`.
    FeatureTable::new(ids, columns).ok_or_else(|| DatasetLoadError::Csv {
        path: path.to_path_buf(),
        source: csv::Error::from(std::io::Error::other("column length mismatch")),
    })
}
