use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

const APP_DIR: &str = "boost-release-sync";

pub const DEFAULT_ARTIFACTORY_URL: &str =
    "https://boostorg.jfrog.io/artifactory/api/storage/main/";
pub const DEFAULT_RELEASE_NOTES_URL: &str =
    "https://raw.githubusercontent.com/boostorg/website/master/users/history/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_artifactory_url")]
    pub artifactory_url: String,

    #[serde(default = "default_release_notes_url")]
    pub release_notes_base_url: String,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("releases.db").to_string_lossy().to_string()
}

fn default_artifactory_url() -> String {
    DEFAULT_ARTIFACTORY_URL.to_string()
}

fn default_release_notes_url() -> String {
    DEFAULT_RELEASE_NOTES_URL.to_string()
}

fn default_max_concurrent_fetches() -> usize {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            artifactory_url: default_artifactory_url(),
            release_notes_base_url: default_release_notes_url(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load the config at `path`, writing the defaults there first if it doesn't exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            config
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("artifactory_url", &self.artifactory_url),
            ("release_notes_base_url", &self.release_notes_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", name, e)))?;
            // Paths are appended directly to these
            if !value.ends_with('/') {
                return Err(AppError::Config(format!("{} must end with '/'", name)));
            }
        }
        if self.max_concurrent_fetches == 0 {
            return Err(AppError::Config(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
