//! Global configuration management
//!
//! Reads global settings from `config.toml` in the platform config
//! directory (`~/.config/forgeplan` on Linux). Global settings cover the
//! collaborator endpoints and output preferences; a missing file means
//! defaults everywhere. `FORGEPLAN_CONFIG_DIR` overrides the directory.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::defaults;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "FORGEPLAN_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "forgeplan";

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for forgeplan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Repository collaborator settings
    #[serde(default)]
    pub repository: EndpointConfig,

    /// Orchestrator collaborator settings
    #[serde(default)]
    pub orchestrator: EndpointConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputPrefs,
}

/// Endpoint settings for one collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL
    pub url: Option<String>,

    /// Maximum retry attempts for transient failures
    pub max_retries: Option<u32>,
}

/// Output preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputPrefs {
    /// Enable quiet mode by default
    pub quiet: Option<bool>,

    /// Emit JSON by default
    pub json: Option<bool>,
}

impl GlobalConfig {
    /// Load the global config, falling back to defaults when absent
    pub fn load() -> Result<Self, GlobalConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Path of the global config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    fn config_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_NAME)
    }

    /// Effective repository base URL
    pub fn repository_url(&self) -> String {
        self.repository
            .url
            .clone()
            .unwrap_or_else(|| defaults::REPOSITORY_URL.to_string())
    }

    /// Effective orchestrator base URL
    pub fn orchestrator_url(&self) -> String {
        self.orchestrator
            .url
            .clone()
            .unwrap_or_else(|| defaults::ORCHESTRATOR_URL.to_string())
    }
}
