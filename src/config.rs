//! Runtime configuration.
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file) is a valid configuration.
//!
//! ```toml
//! [runner]
//! interpreter = "python3"
//! prescription_module = "work/prescribe.py"
//! skip_existing = true
//!
//! [validation]
//! parallel = true
//! default_start_date = "2020-12-22"
//! default_end_date = "2021-06-19"
//! ```

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Prescription generation settings.
    pub runner: RunnerConfig,
    /// Validation settings.
    pub validation: ValidationConfig,
}

/// How prescriptions are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Program used to run the prescription module.
    pub interpreter: String,
    /// Script that generates prescriptions.
    pub prescription_module: Option<PathBuf>,
    /// Skip tasks whose output file already exists.
    pub skip_existing: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            prescription_module: None,
            skip_existing: true,
        }
    }
}

/// How submissions are validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Validate prescription variants in parallel.
    pub parallel: bool,
    /// Start date used when none is given on the command line.
    pub default_start_date: String,
    /// End date used when none is given on the command line.
    pub default_end_date: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            default_start_date: "2020-12-22".to_string(),
            default_end_date: "2021-06-19".to_string(),
        }
    }
}

impl JudgeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Read a configuration file if one was given, else use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
