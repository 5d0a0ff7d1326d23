//! Configuration management for the batcher
//!
//! This module handles loading, validation, and merging of batcher configuration.

pub mod loader;
pub mod models;
pub mod validation;


pub use models::*;
pub use validation::Validate;

use crate::utils::error::{BatchError, Result};
use std::path::Path;
use tracing::{debug, info};

impl BatcherConfig {
    /// Load configuration from a YAML (or JSON) file
    ///
    /// Read failures surface as [`BatchError::Io`], malformed files as
    /// [`BatchError::Yaml`] and out-of-range values as [`BatchError::Config`].
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await?;
        let config: BatcherConfig = serde_yaml::from_str(&content)?;

        config.check()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate, mapping failures to [`BatchError::Config`]
    pub fn check(&self) -> Result<()> {
        Validate::validate(self).map_err(BatchError::Config)
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BatchError::Config(format!("Failed to serialize config to JSON: {}", e)))
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| BatchError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
