//! Run configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file reproduces
//! the standard training run for the procurement dataset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::app_dirs::{self, AppDirError};
use crate::dataset::paths::{DEFAULT_DATA_PATH, FALLBACK_DATA_PATH};
use crate::dataset::schema::DEFAULT_TARGET_COLUMN;
use crate::ml::transformer::TrainOptions;

/// Default filename used to store the run configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that may occur while loading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a config file.
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
    /// A value parsed but is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
    /// No config root could be resolved.
    #[error("Config directory unavailable: {0}")]
    AppDir(#[from] AppDirError),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub training: TrainOptions,
    #[serde(default)]
    pub sample: SampleSettings,
}

/// Where the dataset lives and which column is predicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSettings {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Checked when `path` does not exist.
    #[serde(default = "default_fallback_path")]
    pub fallback_path: PathBuf,
    #[serde(default = "default_target_column")]
    pub target_column: String,
}

/// Size and seed of the post-training sanity sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSettings {
    #[serde(default = "default_sample_size")]
    pub size: usize,
    #[serde(default = "default_sample_seed")]
    pub seed: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            fallback_path: default_fallback_path(),
            target_column: default_target_column(),
        }
    }
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self {
            size: default_sample_size(),
            seed: default_sample_seed(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_fallback_path() -> PathBuf {
    PathBuf::from(FALLBACK_DATA_PATH)
}

fn default_target_column() -> String {
    DEFAULT_TARGET_COLUMN.to_string()
}

fn default_sample_size() -> usize {
    5
}

fn default_sample_seed() -> u64 {
    42
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.target_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "data.target_column must not be empty".to_string(),
            ));
        }
        if self.sample.size == 0 {
            return Err(ConfigError::Invalid(
                "sample.size must be at least 1".to_string(),
            ));
        }
        self.training.validate().map_err(ConfigError::Invalid)
    }
}

/// Path of `config.toml` inside the app directory. Nothing is created.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(app_dirs::app_root_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the app-directory config.
///
/// Defaults are used when the app directory cannot be resolved or holds no
/// config file. A config file that exists but fails to load is an error.
pub fn load_or_default() -> Result<RunConfig, ConfigError> {
    let path = match config_path() {
        Ok(path) => path,
        Err(err) => {
            warn!("{err}; using default configuration");
            return Ok(RunConfig::default());
        }
    };
    if !path.is_file() {
        debug!("No config at {}; using defaults", path.display());
        return Ok(RunConfig::default());
    }
    load_from_path(&path)
}

/// Load an explicit config file; a missing file is an error.
pub fn load_from_path(path: &Path) -> Result<RunConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RunConfig = toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_yields_defaults() {
        let config: RunConfig = toml::from_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.data.target_column, "낙찰가");
        assert_eq!(config.data.path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.sample.size, 5);
        assert_eq!(config.sample.seed, 42);
        assert_eq!(config.training, TrainOptions::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[data]\npath = \"bids.csv\"\n\n[training]\nepochs = 5\ntarget_log = false\n",
        )
        .unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.data.path, PathBuf::from("bids.csv"));
        assert_eq!(config.data.fallback_path, PathBuf::from(FALLBACK_DATA_PATH));
        assert_eq!(config.training.epochs, 5);
        assert!(!config.training.target_log);
        assert_eq!(config.training.patience, 10);
        assert_eq!(config.training.d_model, 512);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[sample]\nsize = 0\n").unwrap();
        assert!(matches!(load_from_path(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, "[training]\nepochs = \"many\"\n").unwrap();
        assert!(matches!(
            load_from_path(&path),
            Err(ConfigError::ParseToml { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
