//! Runtime configuration for the action core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::modules::interface::StaticBuildContext;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {error}")]
    Read { path: String, error: String },

    #[error("Invalid YAML in config {path}: {reason}")]
    InvalidYaml { path: String, reason: String },

    #[error("Invalid config value {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level configuration, loaded from YAML. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Delay the orchestrator waits before restarting the host
    pub restart_timeout_secs: u32,
    pub powershell: PowerShellConfig,
    pub googet: GooGetConfig,
    pub build: StaticBuildContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerShellConfig {
    pub system_path: PathBuf,
    pub winpe_path: PathBuf,
    /// Directory holding installer resources for `run_resource`
    pub resource_root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GooGetConfig {
    pub system_root: PathBuf,
    pub winpe_root: PathBuf,
    /// Overrides `<root>/googet.exe`
    pub binary: Option<PathBuf>,
    pub retries: u32,
    pub sleep_secs: u64,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            restart_timeout_secs: 5,
            powershell: PowerShellConfig::default(),
            googet: GooGetConfig::default(),
            build: StaticBuildContext::default(),
        }
    }
}

impl Default for PowerShellConfig {
    fn default() -> Self {
        Self {
            system_path: PathBuf::from(
                r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe",
            ),
            winpe_path: PathBuf::from(
                r"X:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe",
            ),
            resource_root: None,
        }
    }
}

impl Default for GooGetConfig {
    fn default() -> Self {
        Self {
            system_root: PathBuf::from(r"C:\ProgramData\GooGet"),
            winpe_root: PathBuf::from(r"X:\ProgramData\GooGet"),
            binary: None,
            retries: 5,
            sleep_secs: 30,
        }
    }
}

impl PowerShellConfig {
    pub fn interpreter(&self, winpe: bool) -> &Path {
        if winpe {
            &self.winpe_path
        } else {
            &self.system_path
        }
    }
}

impl GooGetConfig {
    pub fn root(&self, winpe: bool) -> &Path {
        if winpe {
            &self.winpe_root
        } else {
            &self.system_root
        }
    }

    pub fn default_binary(&self, winpe: bool) -> PathBuf {
        self.binary
            .clone()
            .unwrap_or_else(|| self.root(winpe).join("googet.exe"))
    }
}

impl ActionsConfig {
    /// Parse and validate an inline YAML document. Empty input gives the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Self::parse_yaml(content, "<inline>")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse_yaml(&content, &path.display().to_string())
    }

    /// Reject values the actions would only refuse at run time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.googet.retries < 1 {
            return Err(ConfigError::InvalidValue {
                field: "googet.retries",
                reason: format!("must be at least 1, got {}", self.googet.retries),
            });
        }
        Ok(())
    }

    fn parse_yaml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
                path: origin.to_string(),
                reason: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }
}
