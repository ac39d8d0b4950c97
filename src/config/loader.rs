//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        settings.validate()?;

        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from the per-user default location, if any
    pub fn load_default(&self) -> Result<Settings> {
        let path = Self::default_path();
        self.load(path.as_deref())
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// `<config dir>/opentam/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("opentam").join("config.toml"))
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
