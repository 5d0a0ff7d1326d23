//! Error-code table
//!
//! Maps transport failure codes to the result recorded in place of a
//! response. `INVALID_TASK` and `ERROR_API_URL` are always present.

use super::types::ResultCode;
use crate::config::ResultCodeConfig;
use crate::utils::net::TransportError;
use std::collections::{BTreeMap, HashMap};

/// Recorded for requests that fail validation
pub const INVALID_TASK: &str = "INVALID_TASK";
/// Fallback for transport failures with no dedicated entry
pub const ERROR_API_URL: &str = "ERROR_API_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCodeTable {
    codes: HashMap<String, ResultCode>,
}

impl Default for ErrorCodeTable {
    fn default() -> Self {
        let defaults = [
            ResultCode::new(INVALID_TASK, 400, "invalid task"),
            ResultCode::new(ERROR_API_URL, 502, "unable to reach API URL"),
            ResultCode::new("ETIMEDOUT", 504, "request timed out"),
            ResultCode::new("ESOCKETTIMEDOUT", 504, "socket timed out"),
            ResultCode::new("ECONNREFUSED", 503, "connection refused"),
            ResultCode::new("ECONNRESET", 502, "connection reset by peer"),
            ResultCode::new("ENOTFOUND", 502, "host not found"),
        ];
        Self {
            codes: defaults
                .into_iter()
                .map(|code| (code.code.clone(), code))
                .collect(),
        }
    }
}

impl ErrorCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with configured entries added or replaced
    pub fn from_config(overrides: &BTreeMap<String, ResultCodeConfig>) -> Self {
        let mut table = Self::default();
        for (code, entry) in overrides {
            table.insert(ResultCode::new(
                code.clone(),
                entry.status_code,
                entry.body.clone(),
            ));
        }
        table
    }

    pub fn insert(&mut self, code: ResultCode) {
        self.codes.insert(code.code.clone(), code);
    }

    pub fn get(&self, code: &str) -> Option<&ResultCode> {
        self.codes.get(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn invalid_task(&self) -> ResultCode {
        self.required(INVALID_TASK, 400, "invalid task")
    }

    pub fn api_url_error(&self) -> ResultCode {
        self.required(ERROR_API_URL, 502, "unable to reach API URL")
    }

    /// Result for a transport failure, falling back to `ERROR_API_URL`
    pub fn classify(&self, error: &TransportError) -> ResultCode {
        self.get(error.code())
            .cloned()
            .unwrap_or_else(|| self.api_url_error())
    }

    fn required(&self, code: &str, status_code: u16, body: &str) -> ResultCode {
        self.get(code)
            .cloned()
            .unwrap_or_else(|| ResultCode::new(code, status_code, body))
    }
}
