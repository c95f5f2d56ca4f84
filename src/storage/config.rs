//! JSON Configuration Management
//!
//! Resolves the server configuration: defaults, then an optional JSON file,
//! then environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::ServerConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::config_path;

/// Configuration service for the server
#[derive(Debug)]
pub struct ConfigService {
    config_path: Option<PathBuf>,
    config: ServerConfig,
}

impl ConfigService {
    /// Load configuration from `explicit` (must exist) or the default
    /// ~/.noviq/config.json (used only if present), then the process
    /// environment.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    /// Same as [`ConfigService::load`] with a custom environment lookup.
    pub fn load_with<F>(explicit: Option<&Path>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(path.to_path_buf())
            }
            None => config_path().ok().filter(|p| p.exists()),
        };

        let mut config = match &config_path {
            Some(path) => Self::load_from_file(path)?,
            None => ServerConfig::default(),
        };
        config.apply_env(lookup).map_err(AppError::config)?;
        config.validate().map_err(AppError::config)?;

        tracing::debug!(
            file = ?config_path,
            bind = %config.bind,
            brief_model = %config.brief.model,
            extended_model = %config.extended.model,
            "configuration loaded"
        );

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<ServerConfig> {
        let content = fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &ServerConfig {
        &self.config
    }

    /// Consume the service, keeping the configuration
    pub fn into_config(self) -> ServerConfig {
        self.config
    }

    /// File the configuration came from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
