//! Configuration loading from environment variables

use super::models::BatcherConfig;
use crate::core::batch::Timeout;
use crate::utils::error::{BatchError, Result};
use std::env;
use tracing::debug;

pub const ENV_MAX_CONCURRENT_BATCHES: &str = "BATCHELOR_MAX_CONCURRENT_BATCHES";
pub const ENV_ORIGINAL_HEADER: &str = "BATCHELOR_ORIGINAL_HEADER";
pub const ENV_REQUEST_TIMEOUT: &str = "BATCHELOR_REQUEST_TIMEOUT";
pub const ENV_REQUEST_METHOD: &str = "BATCHELOR_REQUEST_METHOD";

impl BatcherConfig {
    /// Defaults overlaid with whatever the environment provides
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`BatcherConfig::from_env`], reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading configuration from environment variables");
        let mut config = Self::default();

        if let Some(limit) = lookup(ENV_MAX_CONCURRENT_BATCHES) {
            config.max_concurrent_batches = limit.trim().parse().map_err(|e| {
                BatchError::Config(format!("Invalid {}: {}", ENV_MAX_CONCURRENT_BATCHES, e))
            })?;
        }
        if let Some(flag) = lookup(ENV_ORIGINAL_HEADER) {
            config.original_header = parse_flag(&flag).ok_or_else(|| {
                BatchError::Config(format!("Invalid {}: {}", ENV_ORIGINAL_HEADER, flag))
            })?;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            let millis: u64 = timeout.trim().parse().map_err(|e| {
                BatchError::Config(format!("Invalid {}: {}", ENV_REQUEST_TIMEOUT, e))
            })?;
            config.request.timeout = Some(Timeout::Millis(millis));
        }
        if let Some(method) = lookup(ENV_REQUEST_METHOD) {
            config.request.method = Some(method.trim().to_string());
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
