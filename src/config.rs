//! Runtime configuration.
//!
//! Every section has defaults, so an empty JSON object (or no file at all) yields a working
//! configuration. Unknown keys are rejected.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Urls longer than this are rebuilt without the pattern parameter.
pub const DEFAULT_MAX_URL_LENGTH: usize = 4000;
/// Number of queries kept in the history log.
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;
pub const DEFAULT_HISTORY_NAMESPACE: &str = "cf";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_NGRAM_MAX_SIZE: usize = 5;

const CONFIG_DIR_NAME: &str = "corpus-query-state";
const CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub url: UrlSettings,
    pub history: HistorySettings,
    pub estimator: EstimatorSettings,
    pub explore: ExploreSettings,
    pub tagset: Option<TagsetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlSettings {
    pub max_length: usize,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self { max_length: DEFAULT_MAX_URL_LENGTH }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistorySettings {
    /// Prefix of the persisted key, `{namespace}/history/{corpus}`
    pub namespace: String,
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { namespace: DEFAULT_HISTORY_NAMESPACE.to_string(), capacity: DEFAULT_HISTORY_CAPACITY }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorSettings {
    pub debounce_ms: u64,
}

impl EstimatorSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self { debounce_ms: DEFAULT_DEBOUNCE_MS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExploreSettings {
    pub ngram_max_size: usize,
}

impl Default for ExploreSettings {
    fn default() -> Self {
        Self { ngram_max_size: DEFAULT_NGRAM_MAX_SIZE }
    }
}

/// A group of sub-annotations edited as one field of the main tagset annotation.
///
/// Only takes effect for corpora that have an annotation with uiType `pos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagsetConfig {
    pub main_annotation_id: String,
    #[serde(default)]
    pub sub_annotation_ids: Vec<String>,
}

impl TagsetConfig {
    pub fn contains(&self, annotation_id: &str) -> bool {
        self.main_annotation_id == annotation_id
            || self.sub_annotation_ids.iter().any(|id| id == annotation_id)
    }
}

impl Config {
    /// Load configuration from `path`, or from the platform config directory when no path is
    /// given. A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => match default_config_path() {
                Some(candidate) if candidate.exists() => candidate,
                _ => return Ok(Self::default()),
            },
        };

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.url.max_length, 4000);
        assert_eq!(config.history.capacity, 40);
        assert_eq!(config.history.namespace, "cf");
        assert_eq!(config.estimator.debounce(), Duration::from_millis(1000));
        assert_eq!(config.explore.ngram_max_size, 5);
        assert!(config.tagset.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"history":{{"capacity":10}},"tagset":{{"main_annotation_id":"pos","sub_annotation_ids":["num"]}}}}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.history.namespace, "cf");
        let tagset = config.tagset.unwrap();
        assert!(tagset.contains("pos"));
        assert!(tagset.contains("num"));
        assert!(!tagset.contains("lemma"));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"urls":{{"max_length":10}}}}"#).unwrap();

        let result = Config::load(Some(file.path()));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/config.json")));
        assert!(result.is_err());
    }
}
