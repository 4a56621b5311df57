use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};
use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// A missing file is not an error; it means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_backend_url(url: &str) -> Result<PathBuf> {
        let path = Self::get_config_path()?;
        Self::save_backend_url_to(&path, url)?;
        Ok(path)
    }

    /// Keeps the other settings in the file. An unreadable file is copied to
    /// `<name>.bak` and replaced by defaults plus the new URL.
    pub fn save_backend_url_to(path: &Path, url: &str) -> Result<()> {
        let mut config = match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                let backup = path.with_extension("json.bak");
                warn!(path = %path.display(), backup = %backup.display(), error = %e,
                    "config file unreadable, resetting other settings to defaults");
                fs::copy(path, &backup)?;
                Self::new()
            }
        };
        config.backend_url = Some(url.to_string());
        config.save_to(path)
    }

    /// Flag/env override beats the file, the file beats the default.
    pub fn backend_url(&self, override_url: Option<&str>) -> String {
        override_url
            .or(self.backend_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL)
            .to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("product-predict").join("config.json"))
    }
}
