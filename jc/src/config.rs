//! JarvisCore configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::controller::ControllerConfig;

/// Main JarvisCore configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Controller behaviour
    pub controller: ControllerConfig,

    /// Memory store location
    pub memory: MemoryConfig,

    /// Builtin components to register on `jc run`
    pub components: ComponentsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, it must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .jarviscore.yml
        let local_config = PathBuf::from(".jarviscore.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/jarviscore/jarviscore.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("jarviscore").join("jarviscore.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// SQLite database file
    #[serde(rename = "db-path")]
    pub db_path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        // ~/.local/share/jarviscore on Linux
        let db_path = dirs::data_local_dir()
            .map(|d| d.join("jarviscore"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(memorystore::DEFAULT_DB_FILE);

        Self { db_path }
    }
}

/// Builtin component toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Persist bus traffic to the memory store
    pub recorder: bool,

    /// Seconds between heartbeats; 0 disables the heartbeat component
    #[serde(rename = "heartbeat-interval-secs")]
    pub heartbeat_interval_secs: u64,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            recorder: true,
            heartbeat_interval_secs: 0,
        }
    }
}
