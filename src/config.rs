use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_LOG_FILE, DEFAULT_RESOURCE};

/// Client configuration, loaded from `~/.blog-admin/config.yaml`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, e.g. `http://localhost:5000/api`
    pub base_url: String,
    /// Collection path segment under `base_url`
    pub resource: String,
    /// Per-request timeout; unset means calls wait indefinitely
    pub timeout_secs: Option<u64>,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource: DEFAULT_RESOURCE.to_string(),
            timeout_secs: None,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".blog-admin")
    }

    /// Load from the default location, then apply the environment override
    pub fn load() -> Result<Self> {
        let mut config = Self::load_or_init(&Self::config_dir().join("config.yaml"))?;
        config.apply_override(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Like `load_from`, but a missing file is created with the defaults
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Config::default();
        config
            .save_to(path)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        Ok(config)
    }

    /// A missing file yields defaults; a malformed one is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    fn apply_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
    }

    /// Full URL of the collection
    pub fn collection_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.resource.trim_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "base_url: https://cms.example.com/\ntimeout_secs: 10\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://cms.example.com/");
        assert_eq!(config.timeout_secs, Some(10));
        assert_eq!(config.resource, DEFAULT_RESOURCE);
        assert_eq!(config.collection_url(), "https://cms.example.com/blogs");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "timeout_secs: [nope").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = Config {
            resource: "posts".into(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".blog-admin").join("config.yaml");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        fs::write(&path, "resource: posts\n").unwrap();
        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.resource, "posts");
    }

    #[test]
    fn test_env_override_ignores_blank() {
        let mut config = Config::default();
        config.apply_override(Some("  ".into()));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        config.apply_override(Some("http://10.0.0.2:8080".into()));
        assert_eq!(config.collection_url(), "http://10.0.0.2:8080/blogs");
    }
}
