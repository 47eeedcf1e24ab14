//! TOML-backed settings for classifier training and report output.
//!
//! Rule thresholds are fixed constants in `labeling` and are not read from
//! here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::forest::ForestOptions;

/// File name of the settings file inside the app root.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that may occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML: {0}")]
    SerializeToml(#[from] toml::ser::Error),
}

/// Top-level settings file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestorConfig {
    #[serde(default)]
    pub classifier: ClassifierSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Random forest hyperparameters, shared by all four labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default = "default_trees")]
    pub trees: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_bootstrap")]
    pub bootstrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Raw rows shown before aggregation.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

fn default_trees() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

fn default_bootstrap() -> bool {
    true
}

fn default_preview_rows() -> usize {
    5
}

fn default_output_file() -> PathBuf {
    PathBuf::from("company_predictions.csv")
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            seed: default_seed(),
            bootstrap: default_bootstrap(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            output_file: default_output_file(),
        }
    }
}

impl SuggestorConfig {
    /// Clamp values that would make training or display meaningless.
    pub fn normalized(mut self) -> Self {
        self.classifier.trees = self.classifier.trees.max(1);
        self.classifier.min_samples_split = self.classifier.min_samples_split.max(2);
        self.classifier.min_samples_leaf = self.classifier.min_samples_leaf.max(1);
        self.report.preview_rows = self.report.preview_rows.max(1);
        self
    }

    pub fn forest_options(&self) -> ForestOptions {
        let c = &self.classifier;
        ForestOptions {
            trees: c.trees,
            max_depth: c.max_depth,
            min_samples_split: c.min_samples_split,
            min_samples_leaf: c.min_samples_leaf,
            bootstrap: c.bootstrap,
            seed: c.seed,
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Path of the settings file under an app root.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load settings from `path`; a missing file yields defaults.
pub fn load_from(path: &Path) -> Result<SuggestorConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(SuggestorConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<SuggestorConfig>(&text)
        .map(SuggestorConfig::normalized)
        .map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
}

/// Load `<root>/config.toml`, returning defaults if it is missing.
pub fn load_or_default(root: &Path) -> Result<SuggestorConfig, ConfigError> {
    load_from(&config_path(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SuggestorConfig::default());
        let options = config.forest_options();
        assert_eq!(options.trees, 100);
        assert_eq!(options.seed, 42);
        assert_eq!(options.max_depth, None);
        assert!(options.bootstrap);
        assert_eq!(config.report.preview_rows, 5);
        assert_eq!(
            config.report.output_file,
            PathBuf::from("company_predictions.csv")
        );
    }

    #[test]
    fn partial_file_overrides_named_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[classifier]\ntrees = 12\nmax_depth = 4\nseed = 9\n\n[report]\noutput_file = \"out/p.csv\"\n",
        )
        .unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.classifier.trees, 12);
        assert_eq!(config.classifier.max_depth, Some(4));
        assert_eq!(config.classifier.seed, 9);
        assert_eq!(config.classifier.min_samples_split, 2);
        assert_eq!(config.report.preview_rows, 5);
        assert_eq!(config.report.output_file, PathBuf::from("out/p.csv"));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[classifier]\ntrees = 0\nmin_samples_split = 0\nmin_samples_leaf = 0\n\n[report]\npreview_rows = 0\n",
        )
        .unwrap();
        let config = load_from(&path).unwrap();
        assert_eq!(config.classifier.trees, 1);
        assert_eq!(config.classifier.min_samples_split, 2);
        assert_eq!(config.classifier.min_samples_leaf, 1);
        assert_eq!(config.report.preview_rows, 1);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\ntrees = \"many\"\n").unwrap();
        match load_from(&path) {
            Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn load_or_default_reads_root_config() {
        let root = tempdir().unwrap();
        assert_eq!(load_or_default(root.path()).unwrap(), SuggestorConfig::default());

        std::fs::write(config_path(root.path()), "[classifier]\nseed = 1234\n").unwrap();
        assert_eq!(load_or_default(root.path()).unwrap().classifier.seed, 1234);
    }

    #[test]
    fn toml_output_round_trips_values() {
        let mut config = SuggestorConfig::default();
        config.classifier.trees = 7;
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("trees = 7"));
        let parsed: SuggestorConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
