use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::api::DEFAULT_BASE_URL;

/// Environment variable that overrides the configured server address
pub const SERVER_URL_ENV: &str = "PIXCHAT_SERVER_URL";

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Server address: environment first, then the config file, then the built-in default
    pub fn server_url(&self) -> String {
        let env_url = std::env::var(SERVER_URL_ENV).ok();
        resolve_server_url(env_url.as_deref(), self.server_url.as_deref())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("pixchat").join("config.json"))
    }
}

fn resolve_server_url(env_url: Option<&str>, configured: Option<&str>) -> String {
    env_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| configured.map(str::trim).filter(|url| !url.is_empty()))
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}
