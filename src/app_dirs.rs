//! Application directory helpers anchored to a single `.comprank` folder.
//!
//! Log files live under the OS local data directory by default. Setting
//! `COMPRANK_CONFIG_HOME` relocates the whole tree, which keeps test runs and
//! portable setups away from the user's real profile.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the base directory.
pub const APP_DIR_NAME: &str = ".comprank";

/// Environment variable that overrides the base directory.
pub const CONFIG_HOME_ENV: &str = "COMPRANK_CONFIG_HOME";

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the override variable nor an OS data directory is available.
    #[error("No suitable base directory available for application files")]
    NoBaseDir,
    /// Failed to create one of the application directories.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolved application directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Resolve the `.comprank` root from the environment and create it.
    pub fn resolve() -> Result<Self, AppDirError> {
        let base = base_dir().ok_or(AppDirError::NoBaseDir)?;
        Self::under(&base)
    }

    /// Use `base/.comprank` as the root, creating it if needed.
    pub fn under(base: &Path) -> Result<Self, AppDirError> {
        let root = base.join(APP_DIR_NAME);
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `logs` directory, creating it if needed.
    pub fn logs(&self) -> Result<PathBuf, AppDirError> {
        let path = self.root.join("logs");
        ensure_dir(&path)?;
        Ok(path)
    }
}

fn ensure_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn base_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.data_local_dir().to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn root_and_logs_are_created_under_base() {
        let base = tempdir().unwrap();
        let dirs = AppDirs::under(base.path()).unwrap();
        assert_eq!(dirs.root(), base.path().join(APP_DIR_NAME));
        assert!(dirs.root().is_dir());

        let logs = dirs.logs().unwrap();
        assert_eq!(logs, base.path().join(APP_DIR_NAME).join("logs"));
        assert!(logs.is_dir());
    }

    #[test]
    fn under_is_repeatable() {
        let base = tempdir().unwrap();
        let first = AppDirs::under(base.path()).unwrap();
        let second = AppDirs::under(base.path()).unwrap();
        assert_eq!(first, second);
    }
}
