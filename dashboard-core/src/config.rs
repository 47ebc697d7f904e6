use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::client::WeatherClient;
use crate::session::DEFAULT_FORECAST_DAYS;

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// WeatherAPI.com API key. Falls back to `WEATHER_API_KEY` when absent.
    pub api_key: Option<String>,

    /// Override for the API base URL; mostly useful behind a proxy.
    pub base_url: Option<String>,

    /// Forecast day count requested by default.
    pub forecast_days: Option<u8>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-dashboard", "dashboard-core")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key resolution order: explicit config field, then environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS)
    }

    /// Build a ready [`WeatherClient`] from this configuration.
    pub fn client(&self) -> Result<WeatherClient> {
        let api_key = self.resolve_api_key().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: set `api_key` in the config file or export {API_KEY_ENV}."
            )
        })?;

        let client = match &self.base_url {
            Some(base_url) => WeatherClient::with_base_url(api_key, base_url),
            None => WeatherClient::new(api_key),
        };

        Ok(client)
    }
}
