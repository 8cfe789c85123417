//! CLI configuration

use crate::error::{CliError, CliResult};
use gapfill_engine::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// CLI configuration, read from `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Reference lists file (JSON) used in reference property mode
    pub reference: Option<PathBuf>,

    /// Search settings
    pub search: SearchConfig,
}

impl CliConfig {
    /// Load configuration from file
    ///
    /// A missing file means defaults.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&contents)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> CliResult<Self> {
        toml::from_str(contents).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("gapfill").join("config.toml"))
    }
}
