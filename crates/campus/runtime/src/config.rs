//! Campus configuration

use crate::error::{CampusError, Result};
use campus_types::AccountId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Campus configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CampusConfig {
    /// Owner of every deployed module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<AccountId>,

    pub logging: LoggingConfig,

    pub journal: JournalConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Record committed events
    pub enabled: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CampusConfig {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CampusConfig =
                toml::from_str(&contents).map_err(|e| CampusError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CampusConfig::default())
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CampusError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("campus").join("config.toml"))
    }

    pub fn with_owner(mut self, owner: AccountId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CampusError::Config(e.to_string()))
    }
}
