//! Configuration data models

use crate::core::batch::{BatchRequest, Timeout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default concurrency bound for one batch
pub fn default_max_concurrent_batches() -> usize {
    50
}

/// Default per-request timeout in milliseconds
pub fn default_request_timeout() -> u64 {
    10_000
}

/// Default request template
pub fn default_request_template() -> BatchRequest {
    BatchRequest {
        method: Some("GET".to_string()),
        timeout: Some(Timeout::Millis(default_request_timeout())),
        ip: Some("unknown".to_string()),
        ..Default::default()
    }
}

/// Batcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatcherConfig {
    /// Maximum number of requests in flight for one batch
    #[serde(default = "default_max_concurrent_batches")]
    pub max_concurrent_batches: usize,
    /// Template every incoming request is laid over
    #[serde(default = "default_request_template")]
    pub request: BatchRequest,
    /// Echo raw response headers as `originalHeader`
    #[serde(default)]
    pub original_header: bool,
    /// Extra or replacement error-code table entries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub error_codes: BTreeMap<String, ResultCodeConfig>,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_batches: default_max_concurrent_batches(),
            request: default_request_template(),
            original_header: false,
            error_codes: BTreeMap::new(),
        }
    }
}

impl BatcherConfig {
    pub fn with_max_concurrent_batches(mut self, limit: usize) -> Self {
        self.max_concurrent_batches = limit;
        self
    }

    pub fn with_request_template(mut self, request: BatchRequest) -> Self {
        self.request = request;
        self
    }

    pub fn with_original_header(mut self, enabled: bool) -> Self {
        self.original_header = enabled;
        self
    }

    /// Merge configurations; values in `other` that differ from the defaults win
    pub fn merge(mut self, other: Self) -> Self {
        if other.max_concurrent_batches != default_max_concurrent_batches() {
            self.max_concurrent_batches = other.max_concurrent_batches;
        }
        if other.request != default_request_template() {
            self.request = self.request.apply_overrides(&other.request);
        }
        if other.original_header {
            self.original_header = true;
        }
        self.error_codes.extend(other.error_codes);
        self
    }
}

/// Error-code table entry as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCodeConfig {
    pub status_code: u16,
    pub body: String,
}
