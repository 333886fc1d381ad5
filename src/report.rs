//! Submission output, training accuracy and importance ranking.

use std::fmt;
use std::path::{Path, PathBuf};

use ordered_float::OrderedFloat;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Header of the identifier column in the submission file.
pub const SUBMISSION_ID_HEADER: &str = "id";
/// Header of the label column in the submission file.
pub const SUBMISSION_LABEL_HEADER: &str = "label";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{ids} identifiers but {labels} labels")]
    LengthMismatch { ids: usize, labels: usize },
    #[error("Failed to create temporary submission next to {path}: {source}")]
    CreateTemp {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write submission {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },
    #[error("Failed to move submission into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct SubmissionRow<'a> {
    id: &'a str,
    label: &'a str,
}

/// Write the `id,label` submission file.
///
/// Rows are written to a temporary file beside `path` and renamed into place,
/// so a failed run never leaves a partial submission behind.
pub fn write_submission(path: &Path, ids: &[String], labels: &[String]) -> Result<(), ReportError> {
    if ids.len() != labels.len() {
        return Err(ReportError::LengthMismatch {
            ids: ids.len(),
            labels: labels.len(),
        });
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::NamedTempFile::new_in(dir).map_err(|source| ReportError::CreateTemp {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source: csv::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(temp.as_file());
    writer
        .write_record([SUBMISSION_ID_HEADER, SUBMISSION_LABEL_HEADER])
        .map_err(write_error)?;
    for (id, label) in ids.iter().zip(labels) {
        writer
            .serialize(SubmissionRow { id, label })
            .map_err(write_error)?;
    }
    writer
        .flush()
        .map_err(|source| write_error(csv::Error::from(source)))?;
    drop(writer);

    temp.persist(path).map_err(|err| ReportError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    info!("Wrote {} predictions to {}", ids.len(), path.display());
    Ok(())
}

/// Exact-match accuracy over a labeled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Fraction of exact matches; `0` for an empty set.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        100.0 * self.ratio()
    }
}

/// Renders the percentage with at least one decimal, e.g. `100.0%`.
impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Training accuracy is: {:?}%", self.percent())
    }
}

/// Compare every predicted label with its actual label.
pub fn training_accuracy(actual: &[String], predicted: &[String]) -> Result<Accuracy, ReportError> {
    if actual.len() != predicted.len() {
        return Err(ReportError::LengthMismatch {
            ids: actual.len(),
            labels: predicted.len(),
        });
    }
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(truth, guess)| truth == guess)
        .count();
    Ok(Accuracy {
        correct,
        total: actual.len(),
    })
}

/// Pair feature names with scores, least important first.
///
/// Ties keep their column order.
pub fn rank_importances(names: &[String], scores: &[f32]) -> Vec<(String, f32)> {
    let mut ranked: Vec<(String, f32)> = names.iter().cloned().zip(scores.iter().copied()).collect();
    ranked.sort_by_key(|(_, score)| OrderedFloat(*score));
    ranked
}

/// Render a ranking as `[("name", score), ...]`.
pub fn format_importances(ranked: &[(String, f32)]) -> String {
    let body = ranked
        .iter()
        .map(|(name, score)| format!("({name:?}, {score})"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{body}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn perfect_predictions_are_full_accuracy() {
        let labels = strings(&["A", "A"]);
        let accuracy = training_accuracy(&labels, &labels).unwrap();
        assert_eq!(accuracy, Accuracy { correct: 2, total: 2 });
        assert_eq!(accuracy.percent(), 100.0);
        assert_eq!(accuracy.to_string(), "Training accuracy is: 100.0%");
    }

    #[test]
    fn partial_accuracy_counts_exact_matches() {
        let accuracy =
            training_accuracy(&strings(&["1", "2", "3", "1"]), &strings(&["1", "2", "1", "2"]))
                .unwrap();
        assert_eq!(accuracy.correct, 2);
        assert_eq!(accuracy.ratio(), 0.5);
    }

    #[test]
    fn accuracy_rejects_length_mismatch() {
        let err = training_accuracy(&strings(&["A"]), &[]).unwrap_err();
        assert!(matches!(err, ReportError::LengthMismatch { ids: 1, labels: 0 }));
    }

    #[test]
    fn ranks_ascending_and_stable() {
        let ranked = rank_importances(&strings(&["a", "b", "c", "d"]), &[0.4, 0.1, 0.4, 0.1]);
        let names: Vec<&str> = ranked.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "a", "c"]);
        assert_eq!(
            format_importances(&ranked[..2]),
            "[(\"b\", 0.1), (\"d\", 0.1)]"
        );
    }

    #[test]
    fn submission_preserves_order_and_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submission.csv");
        write_submission(&path, &strings(&["9", "2", "5"]), &strings(&["1", "3", "1"])).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "id,label\n9,1\n2,3\n5,1\n");
    }

    #[test]
    fn submission_rejects_length_mismatch_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submission.csv");
        let err = write_submission(&path, &strings(&["1"]), &[]).unwrap_err();
        assert!(matches!(err, ReportError::LengthMismatch { .. }));
        assert!(!path.exists());
    }
}
