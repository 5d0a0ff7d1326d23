//! Request validation
//!
//! Every incoming request is laid over the configured template, checked, and
//! either cleaned for dispatch or recorded as an invalid task.

use super::error_codes::ErrorCodeTable;
use super::types::{BatchOutcome, BatchRequest, BatchResults};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, warn};
use url::Url;

/// Pluggable validity rules
pub trait RequestValidator: Send + Sync {
    /// Whether the merged request may be dispatched
    fn is_valid_request(&self, request: &BatchRequest) -> bool;

    /// Strip fields that only matter before dispatch
    fn clean_request(&self, request: BatchRequest) -> BatchRequest;
}

/// Default rules
///
/// A request needs a non-empty name, an absolute http(s) URL, a method that
/// resolves to an HTTP method, and well-formed header names and values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValidator;

impl DefaultValidator {
    pub fn new() -> Self {
        Self
    }
}

impl RequestValidator for DefaultValidator {
    fn is_valid_request(&self, request: &BatchRequest) -> bool {
        has_name(request) && has_http_url(request) && has_method(request) && has_valid_headers(request)
    }

    fn clean_request(&self, mut request: BatchRequest) -> BatchRequest {
        request.persistent = None;
        request.persistent_delay = None;
        request
    }
}

fn has_name(request: &BatchRequest) -> bool {
    request.name.as_deref().is_some_and(|name| !name.is_empty())
}

fn has_http_url(request: &BatchRequest) -> bool {
    match request.url.as_deref() {
        Some(url) if !url.trim().is_empty() => Url::parse(url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
            .unwrap_or(false),
        _ => false,
    }
}

fn has_method(request: &BatchRequest) -> bool {
    request
        .method
        .as_deref()
        .is_some_and(|method| resolve_method(method).is_some())
}

fn has_valid_headers(request: &BatchRequest) -> bool {
    request.headers.iter().all(|(name, value)| {
        HeaderName::from_bytes(name.as_bytes()).is_ok() && HeaderValue::from_str(value).is_ok()
    })
}

/// Resolve a method name case-insensitively
pub fn resolve_method(method: &str) -> Option<Method> {
    if method.trim().is_empty() {
        return None;
    }
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes()).ok()
}

/// Outcome of validating one batch
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch {
    /// Cleaned requests, in input order
    pub valid: Vec<BatchRequest>,
    /// Invalid-task markers keyed by request name or `missingName`
    pub invalid: BatchResults,
}

/// Partition a batch into dispatchable requests and invalid markers.
///
/// The caller's requests are never modified; each is merged into a fresh
/// copy of `template`.
pub fn validate_requests(
    requests: &[BatchRequest],
    template: &BatchRequest,
    validator: &dyn RequestValidator,
    codes: &ErrorCodeTable,
) -> ValidatedBatch {
    debug!(count = requests.len(), "Validating batch requests");
    let mut batch = ValidatedBatch::default();

    for request in requests {
        let merged = template.clone().apply_overrides(request);
        if validator.is_valid_request(&merged) {
            batch.valid.push(validator.clean_request(merged));
        } else {
            let key = request.result_key().to_string();
            warn!(name = %key, url = ?request.url, "Invalid request in batch");
            batch
                .invalid
                .insert(key, BatchOutcome::Code(codes.invalid_task()));
        }
    }

    batch
}
