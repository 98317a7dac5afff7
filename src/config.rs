use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::error::ConfigError;

/// Returns the path to the user's data directory for marquee.
pub fn get_user_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|path| path.join("marquee"))
}

/// Gets the full path to the config.toml file, creating its directory if needed.
fn get_config_path() -> Result<PathBuf, ConfigError> {
    let mut config_path = get_user_data_dir().ok_or(ConfigError::NoDataDir)?;
    fs::create_dir_all(&config_path)?;
    config_path.push("config.toml");
    Ok(config_path)
}

/// Polling cadences, in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub event_ms: u64,
    pub orientation_ms: u64,
    pub catalogue_ms: u64,
    pub setting_values_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            event_ms: 50,
            orientation_ms: 50,
            catalogue_ms: 1000,
            setting_values_ms: 200,
        }
    }
}

// a zero period would make the interval panic
fn period(ms: u64) -> Duration {
    Duration::from_millis(ms.max(1))
}

impl PollingConfig {
    pub fn event_period(&self) -> Duration {
        period(self.event_ms)
    }

    pub fn orientation_period(&self) -> Duration {
        period(self.orientation_ms)
    }

    pub fn catalogue_period(&self) -> Duration {
        period(self.catalogue_ms)
    }

    pub fn setting_values_period(&self) -> Duration {
        period(self.setting_values_ms)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub resolution: String,
    pub fullscreen: bool,
    pub font_color: String,
    pub cursor_color: String,
    pub polling: PollingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            resolution: "640x360".to_string(),
            fullscreen: false,
            font_color: "WHITE".to_string(),
            cursor_color: "WHITE".to_string(),
            polling: PollingConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from config.toml, or returns a default if it fails.
    pub fn load() -> Self {
        let loaded = get_config_path().and_then(|path| Self::from_path(&path));
        match loaded {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(%err, "using default config");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the current configuration to config.toml.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }
}
