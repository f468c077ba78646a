use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/iremkay/veri-analizi-projesi/main/endangered_animals.csv";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Runtime settings. Every field has a default so an absent or partial
/// config file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote CSV tried first when resolving the default dataset.
    pub default_url: String,
    /// Local file tried when the remote default is unavailable.
    pub fallback_path: PathBuf,
    /// Upper bound for any HTTP fetch.
    pub fetch_timeout_secs: u64,
    /// How many correlation pairs to list.
    pub top_pairs: usize,
    /// Largest numeric feature count for which the pair plot is offered.
    pub pairplot_max_features: usize,
    /// Categorical columns summarised with value counts when present.
    pub category_columns: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_DATASET_URL.to_string(),
            fallback_path: PathBuf::from("endangered_animals.csv"),
            fetch_timeout_secs: 10,
            top_pairs: 10,
            pairplot_max_features: 6,
            category_columns: vec![
                "conservation_status".to_string(),
                "continent".to_string(),
                "diet_type".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file named by `EDA_CONFIG` (or
    /// `eda_config.json`), then `EDA_*` environment overrides.
    pub fn load() -> Self {
        let path = std::env::var("EDA_CONFIG").unwrap_or_else(|_| "eda_config.json".to_string());
        let mut config = match Self::from_file(Path::new(&path)) {
            Ok(Some(cfg)) => {
                log::info!("Loaded configuration from {path}");
                cfg
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::error!("Ignoring config file {path}: {e:#}");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).context("reading config file")?;
        let cfg = serde_json::from_str(&text).context("parsing config JSON")?;
        Ok(Some(cfg))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("EDA_DEFAULT_URL") {
            self.default_url = url;
        }
        if let Some(path) = lookup("EDA_FALLBACK_PATH") {
            self.fallback_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("EDA_FETCH_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.fetch_timeout_secs = secs,
                Err(_) => log::warn!("EDA_FETCH_TIMEOUT_SECS={secs} is not a number, keeping default"),
            }
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda_config.json");
        std::fs::write(&path, r#"{ "top_pairs": 3 }"#).unwrap();

        let cfg = AppConfig::from_file(&path).unwrap().unwrap();
        assert_eq!(cfg.top_pairs, 3);
        assert_eq!(cfg.pairplot_max_features, 6);
        assert_eq!(cfg.default_url, DEFAULT_DATASET_URL);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::from_file(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda_config.json");
        std::fs::write(&path, "{ top_pairs: ").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|key| match key {
            "EDA_DEFAULT_URL" => Some("http://localhost/x.csv".to_string()),
            "EDA_FETCH_TIMEOUT_SECS" => Some("oops".to_string()),
            _ => None,
        });
        assert_eq!(cfg.default_url, "http://localhost/x.csv");
        assert_eq!(cfg.fetch_timeout_secs, 10);
    }
}
