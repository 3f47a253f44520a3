use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::model::Units;

pub const DEFAULT_FLOOD_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.openweathermap.org/data/2.5/weather";

pub const ENV_FLOOD_API_BASE: &str = "FLOODMAP_FLOOD_API_BASE";
pub const ENV_WEATHER_API_BASE: &str = "FLOODMAP_WEATHER_API_BASE";
pub const ENV_WEATHER_API_KEY: &str = "FLOODMAP_WEATHER_API_KEY";

/// Flood backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FloodApiConfig {
    pub base_url: String,
}

impl Default for FloodApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_FLOOD_API_BASE.to_string() }
    }
}

/// Weather API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub units: Units,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_API_BASE.to_string(),
            api_key: None,
            units: Units::default(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [flood]
/// base_url = "http://localhost:8000/api"
///
/// [weather]
/// api_key = "..."
/// units = "metric"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub flood: FloodApiConfig,
    pub weather: WeatherApiConfig,
}

impl Config {
    /// Load the config file, then apply `FLOODMAP_*` environment overrides.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_file()?;
        Ok(cfg.with_overrides(|name| std::env::var(name).ok()))
    }

    /// Load the config file, or return defaults if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or return defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save to the platform config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write config to `path`, creating parent directories as needed.
    ///
    /// The TOML goes to a sibling `.tmp` file first and is renamed over
    /// `path`, so an interrupted save leaves the previous file intact.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        let staged = path.with_extension("toml.tmp");
        fs::write(&staged, toml)
            .with_context(|| format!("Failed to write config file: {}", staged.display()))?;
        fs::rename(&staged, path)
            .with_context(|| format!("Failed to replace config file: {}", path.display()))?;

        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "floodmap", "floodmap-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace settings with any non-empty values returned by `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_FLOOD_API_BASE) {
            self.flood.base_url = url;
        }
        if let Some(url) = get(ENV_WEATHER_API_BASE) {
            self.weather.base_url = url;
        }
        if let Some(key) = get(ENV_WEATHER_API_KEY) {
            self.weather.api_key = Some(key);
        }

        self
    }

    pub fn set_weather_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    /// Returns the weather API key, if present.
    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather.api_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn is_weather_configured(&self) -> bool {
        self.weather_api_key().is_some()
    }
}
