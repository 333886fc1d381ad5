//! End-to-end training runs shared by both binaries.
//!
//! A run loads both tables, applies the feature transforms in a fixed order,
//! fits one model on the training rows, writes the test predictions and then
//! scores the model against its own training labels.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, PipelineConfig};
use crate::dataset::{DatasetLoadError, FeatureTable, load_labeled, load_unlabeled};
use crate::features::{
    FeatureError, FeatureMatrix, aggregate_columns, align_columns, apply_skew_correction,
    drop_columns, fill_missing,
};
use crate::ml::metrics::{ConfusionMatrix, precision_recall_by_class};
use crate::ml::{ClassIndex, Classifier, GradientBoosting, ModelError, RandomForest};
use crate::report::{
    Accuracy, ReportError, rank_importances, training_accuracy, write_submission,
};

/// Columns dropped before training the random forest.
pub const FOREST_EXCLUDED_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "path",
    "competition-num",
    "category",
    "description",
    "published",
    "modified",
    "version",
];

/// Columns dropped before training the boosted model.
pub const BOOST_EXCLUDED_COLUMNS: &[&str] = &[
    "name",
    "slug",
    "path",
    "category",
    "description",
    "published",
    "modified",
    "version",
    "num-authors",
    "competition-num",
];

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] DatasetLoadError),
    #[error("Feature preparation failed: {0}")]
    Features(#[from] FeatureError),
    #[error("Model failed: {0}")]
    Model(#[from] ModelError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Which of the two training pipelines to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Forest,
    Boost,
}

impl PipelineKind {
    pub fn excluded_columns(self) -> &'static [&'static str] {
        match self {
            PipelineKind::Forest => FOREST_EXCLUDED_COLUMNS,
            PipelineKind::Boost => BOOST_EXCLUDED_COLUMNS,
        }
    }

    /// Whether numeric columns are log-transformed before fitting.
    pub fn skew_correction(self) -> bool {
        matches!(self, PipelineKind::Boost)
    }

    /// Whether the run reports ranked feature importances.
    pub fn reports_importances(self) -> bool {
        matches!(self, PipelineKind::Boost)
    }

    pub fn build_model(self, config: &PipelineConfig) -> Box<dyn Classifier> {
        match self {
            PipelineKind::Forest => Box::new(RandomForest::new(config.forest.clone())),
            PipelineKind::Boost => Box::new(GradientBoosting::new(config.boost.clone())),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub accuracy: Accuracy,
    /// Number of rows written to the submission file.
    pub predictions: usize,
    /// Features ranked least important first, when the pipeline reports them.
    pub importances: Option<Vec<(String, f32)>>,
}

/// Apply the shared transforms to a freshly loaded table.
pub fn prepare_features(
    table: FeatureTable,
    kind: PipelineKind,
    config: &PipelineConfig,
) -> Result<FeatureTable, FeatureError> {
    let table = drop_columns(table, kind.excluded_columns())?;
    let table = fill_missing(table);
    let table = aggregate_columns(table, &config.data.aggregated_columns)?;
    if kind.skew_correction() {
        apply_skew_correction(table)
    } else {
        Ok(table)
    }
}

/// Execute one full training run.
pub fn run(kind: PipelineKind, config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    let data = &config.data;
    let train = load_labeled(&data.train_path, &data.id_column, &data.label_column)?;
    let test = load_unlabeled(&data.test_path, &data.id_column, &data.label_column)?;

    let train_table = prepare_features(train.features, kind, config)?;
    let test_table = prepare_features(test, kind, config)?;
    let test_table = align_columns(test_table, &train_table.column_names())?;
    let train_matrix = FeatureMatrix::from_table(&train_table)?;
    let test_matrix = FeatureMatrix::from_table(&test_table)?;
    info!(
        "Prepared {} training and {} test rows with {} features",
        train_matrix.n_rows(),
        test_matrix.n_rows(),
        train_matrix.n_features()
    );

    let mut model = kind.build_model(config);
    model.fit(&train_matrix, &train.labels)?;
    info!(
        "Fitted {} with {} estimators",
        model.name(),
        model.estimator_count()
    );

    let test_predictions = model.predict(&test_matrix)?;
    write_submission(&data.submission_path, test_table.ids(), &test_predictions)?;

    let train_predictions = model.predict(&train_matrix)?;
    let accuracy = training_accuracy(&train.labels, &train_predictions)?;
    log_class_metrics(&train.labels, &train_predictions);

    let importances = if kind.reports_importances() {
        model
            .feature_importances()
            .map(|scores| rank_importances(train_matrix.names(), &scores))
    } else {
        None
    };

    Ok(RunSummary {
        accuracy,
        predictions: test_predictions.len(),
        importances,
    })
}

fn log_class_metrics(actual: &[String], predicted: &[String]) {
    let classes = ClassIndex::from_labels(actual);
    let cm = ConfusionMatrix::from_labels(&classes, actual, predicted);
    if cm.skipped > 0 {
        warn!("{} predictions fell outside the training classes", cm.skipped);
    }
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        info!(
            "class {:<16} precision={:.3} recall={:.3} f1={:.3} support={}",
            classes.label(idx),
            stats.precision,
            stats.recall,
            stats.f1,
            stats.support
        );
    }
}
