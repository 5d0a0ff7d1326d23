//! Response normalization
//!
//! Turns what the sender reported into the entry stored in the results map.

use super::error_codes::ErrorCodeTable;
use super::types::{BatchOutcome, BatchRequest, BatchResult};
use crate::utils::net::{RawResponse, TransportError};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    original_header: bool,
    codes: Arc<ErrorCodeTable>,
}

impl ResponseNormalizer {
    pub fn new(original_header: bool, codes: Arc<ErrorCodeTable>) -> Self {
        Self {
            original_header,
            codes,
        }
    }

    /// Normalize one transport outcome.
    ///
    /// An error, or a missing response, yields the error-code table entry for
    /// that failure. A response yields a [`BatchResult`].
    pub fn normalize(
        &self,
        error: Option<&TransportError>,
        response: Option<&RawResponse>,
        request: &BatchRequest,
    ) -> BatchOutcome {
        match (error, response) {
            (None, Some(response)) => BatchOutcome::Response(self.to_result(response, request)),
            (Some(err), _) => {
                error!(
                    url = ?request.url,
                    ip = ?request.ip,
                    code = err.code(),
                    "No response for request: {}",
                    err
                );
                BatchOutcome::Code(self.codes.classify(err))
            }
            (None, None) => {
                error!(url = ?request.url, ip = ?request.ip, "No response for request");
                BatchOutcome::Code(self.codes.api_url_error())
            }
        }
    }

    pub fn normalize_outcome(
        &self,
        outcome: &Result<RawResponse, TransportError>,
        request: &BatchRequest,
    ) -> BatchOutcome {
        match outcome {
            Ok(response) => self.normalize(None, Some(response), request),
            Err(err) => self.normalize(Some(err), None, request),
        }
    }

    fn to_result(&self, response: &RawResponse, request: &BatchRequest) -> BatchResult {
        let body = parse_body(&response.body, request);
        let mut result = BatchResult {
            body,
            headers: response.raw_headers.folded(),
            status_code: response.status_code,
            http_status: response.status_code,
            original_header: None,
        };

        let case_sensitive = request.wants_case_sensitive_headers();
        if self.original_header {
            result.original_header = Some(response.raw_headers.to_raw_string());
        }
        if case_sensitive {
            result.headers = response.raw_headers.case_preserving();
        }

        result
    }
}

/// Parse a body as JSON, keeping it verbatim when it is not JSON.
pub fn parse_body(body: &str, request: &BatchRequest) -> Value {
    match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!(
                url = ?request.url,
                ip = ?request.ip,
                "Response body is not a JSON object, keeping it as a string"
            );
            Value::String(body.to_string())
        }
    }
}
