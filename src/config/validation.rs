//! Configuration validation

use super::models::BatcherConfig;
use crate::core::batch::resolve_method;
use tracing::debug;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for BatcherConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating batcher configuration");

        if self.max_concurrent_batches == 0 {
            return Err("maxConcurrentBatches must be greater than 0".to_string());
        }

        if let Some(method) = self.request.method.as_deref() {
            if resolve_method(method).is_none() {
                return Err(format!("Invalid default request method: {}", method));
            }
        }

        for (code, entry) in &self.error_codes {
            if code.is_empty() {
                return Err("Error code names cannot be empty".to_string());
            }
            if !(100..=599).contains(&entry.status_code) {
                return Err(format!(
                    "Error code {} has invalid status code {}",
                    code, entry.status_code
                ));
            }
        }

        Ok(())
    }
}
