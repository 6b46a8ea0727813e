//! Configuration loading from files.
//!
//! This module handles reading and parsing configuration files.

use std::path::{Path, PathBuf};

use super::{CONFIG_FILE, Config, ConfigError, format_parse_error};

impl Config {
    /// Resolve the config path from the command line argument, defaulting to
    /// `quill.yaml` in the working directory.
    pub fn path_from_arg(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(CONFIG_FILE));
        if config_file.is_relative() {
            Ok(std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file))
        } else {
            Ok(config_file.to_path_buf())
        }
    }

    /// Load the config from the command line argument, defaulting to `quill.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::path_from_arg(config_file)?;
        Self::load_from_file(&path)
    }

    /// Load and validate the config from a file path
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format_parse_error(e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// Get the site root from a config file path (its parent directory).
pub fn site_root_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
