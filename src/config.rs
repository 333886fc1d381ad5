//! Pipeline configuration with compile-time defaults and an optional TOML override.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::ml::{BoostOptions, ForestOptions};

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "comprank.toml";

/// Errors that may occur while loading the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse TOML config.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        /// TOML file path.
        path: PathBuf,
        /// TOML parse error.
        source: toml::de::Error,
    },
}

/// Input/output locations and column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub submission_path: PathBuf,
    pub id_column: String,
    pub label_column: String,
    /// List-valued columns replaced by their token counts.
    pub aggregated_columns: Vec<String>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("dataset/train.csv"),
            test_path: PathBuf::from("dataset/test.csv"),
            submission_path: PathBuf::from("submission.csv"),
            id_column: "id".to_string(),
            label_column: "label".to_string(),
            aggregated_columns: vec!["links".to_string(), "link-tags".to_string()],
        }
    }
}

/// Full configuration for both training pipelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataSettings,
    pub forest: ForestOptions,
    pub boost: BoostOptions,
}

impl PipelineConfig {
    /// Clamp model settings into their valid ranges.
    pub fn normalized(mut self) -> Self {
        self.forest = self.forest.normalized();
        self.boost = self.boost.normalized();
        self
    }
}

/// Load configuration from `path`, returning defaults if the file is missing.
pub fn load_or_default(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        return Ok(PipelineConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&text, path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn parse(text: &str, path: &Path) -> Result<PipelineConfig, ConfigError> {
    let config: PipelineConfig = toml::from_str(text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_or_default(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.data.train_path, PathBuf::from("dataset/train.csv"));
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.boost.rounds, 400);
    }

    #[test]
    fn partial_file_fills_from_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[data]\nsubmission_path = \"out/predictions.csv\"\n\n[forest]\nn_trees = 0\nseed = 7\n",
        )
        .unwrap();
        let config = load_or_default(&path).unwrap();
        assert_eq!(
            config.data.submission_path,
            PathBuf::from("out/predictions.csv")
        );
        assert_eq!(config.data.id_column, "id");
        assert_eq!(config.forest.n_trees, 1);
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.boost, BoostOptions::default());
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[boost\nrounds = 3").unwrap();
        let err = load_or_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }
}
