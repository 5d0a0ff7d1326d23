//! Concurrency-limited dispatch
//!
//! Runs the valid requests of a batch with at most `limit` calls in flight.
//! Requests are prepared and dispatched in input order as permits free up;
//! completion order is unspecified.
//!
//! A request that cannot be prepared aborts the whole batch: dispatch stops,
//! results gathered so far are dropped and the preparation error is returned.
//! Calls already on the wire are detached and allowed to finish.

use super::normalizer::ResponseNormalizer;
use super::types::{BatchOutcome, BatchRequest, BatchResults, Timeout};
use super::validator::resolve_method;
use crate::utils::error::{BatchError, Result};
use crate::utils::net::{HttpSender, PreparedRequest};
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Header carrying the caller's address
pub const FORWARDED_FOR_HEADER: &str = "HTTP_X_FORWARDED_FOR";

pub struct Dispatcher {
    sender: Arc<dyn HttpSender>,
    normalizer: Arc<ResponseNormalizer>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn HttpSender>, normalizer: Arc<ResponseNormalizer>) -> Self {
        Self { sender, normalizer }
    }

    /// Run `valid` under the concurrency bound and merge in the `invalid` markers.
    ///
    /// Invalid markers win when a name appears on both sides.
    pub async fn dispatch(
        &self,
        valid: Vec<BatchRequest>,
        invalid: BatchResults,
        limit: usize,
    ) -> Result<BatchResults> {
        let tasks = collapse_duplicate_names(valid);
        debug!(
            tasks = tasks.len(),
            invalid = invalid.len(),
            limit,
            "Dispatching batch"
        );

        let mut results = self.run(tasks, limit.max(1)).await?;
        results.extend(invalid);
        Ok(results)
    }

    async fn run(&self, tasks: Vec<BatchRequest>, limit: usize) -> Result<BatchResults> {
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut in_flight: JoinSet<(String, BatchOutcome)> = JoinSet::new();

        for request in tasks {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| BatchError::task_failed(e.to_string()))?;

            let prepared = match prepare_request(&request) {
                Ok(prepared) => prepared,
                Err(err) => {
                    error!("Aborting batch, failed to prepare request: {}", err);
                    in_flight.detach_all();
                    return Err(err);
                }
            };

            debug!(
                name = %prepared.name,
                url = %prepared.url,
                method = %prepared.method,
                timeout = ?prepared.timeout,
                "Requesting URL"
            );

            let sender = Arc::clone(&self.sender);
            let normalizer = Arc::clone(&self.normalizer);
            in_flight.spawn(async move {
                let name = prepared.name.clone();
                let outcome = sender.send(prepared).await;
                let result = normalizer.normalize_outcome(&outcome, &request);
                drop(permit);
                (name, result)
            });
        }

        let mut results = BatchResults::new();
        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok((name, outcome)) => {
                    results.insert(name, outcome);
                }
                Err(err) => {
                    error!("Aborting batch, task failed: {}", err);
                    in_flight.detach_all();
                    return Err(err.into());
                }
            }
        }
        Ok(results)
    }
}

/// One task per name. A later request replaces an earlier one with the same
/// name and takes over its dispatch position.
fn collapse_duplicate_names(valid: Vec<BatchRequest>) -> Vec<BatchRequest> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut tasks: Vec<BatchRequest> = Vec::with_capacity(valid.len());

    for request in valid {
        let key = request.result_key().to_string();
        match positions.get(&key) {
            Some(&index) => {
                warn!(name = %key, "Duplicate request name in batch, keeping the last one");
                tasks[index] = request;
            }
            None => {
                positions.insert(key, tasks.len());
                tasks.push(request);
            }
        }
    }

    tasks
}

/// Build the outgoing request for one task.
///
/// Any failure here is a batch-level error.
pub fn prepare_request(request: &BatchRequest) -> Result<PreparedRequest> {
    let name = request.result_key().to_string();
    let fail = |message: String| BatchError::preparation(name.clone(), message);

    let url_text = request
        .url
        .as_deref()
        .ok_or_else(|| fail("missing url".to_string()))?;
    let url = Url::parse(url_text).map_err(|e| fail(format!("invalid url '{}': {}", url_text, e)))?;

    let method_text = request.method.as_deref().unwrap_or("GET");
    let method =
        resolve_method(method_text).ok_or_else(|| fail(format!("invalid method '{}'", method_text)))?;

    let mut headers = HeaderMap::with_capacity(request.headers.len() + 1);
    for (key, value) in &request.headers {
        let header_name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| fail(format!("invalid header name '{}': {}", key, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| fail(format!("invalid value for header '{}': {}", key, e)))?;
        headers.insert(header_name, header_value);
    }
    if let Some(ip) = request.ip.as_deref() {
        let header_value = HeaderValue::from_str(ip)
            .map_err(|e| fail(format!("invalid forwarded ip '{}': {}", ip, e)))?;
        headers.insert(HeaderName::from_static("http_x_forwarded_for"), header_value);
    }

    let payload = request.body.as_ref().or(request.data.as_ref());
    let body = match payload {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone().into_bytes()),
        Some(other) => {
            let bytes = serde_json::to_vec(other)
                .map_err(|e| fail(format!("failed to serialize body: {}", e)))?;
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Some(bytes)
        }
    };

    let timeout = match request.timeout.as_ref().map(coerce_timeout) {
        Some(Timeout::Millis(0)) => {
            warn!(name = %name, "Ignoring zero timeout");
            None
        }
        Some(Timeout::Millis(millis)) => Some(Duration::from_millis(millis)),
        Some(Timeout::Raw(raw)) => {
            warn!(name = %name, timeout = %raw, "Ignoring timeout that is not a positive integer");
            None
        }
        None => None,
    };

    Ok(PreparedRequest {
        name,
        method,
        url,
        headers,
        body,
        timeout,
    })
}

/// Coerce a timeout to integer milliseconds.
///
/// Follows `parseInt` rules: leading whitespace, optional sign, then digits;
/// anything after the digits is ignored. Zero, negative or unparseable values
/// fall back to the original value; [`prepare_request`] sends those without a
/// timeout.
pub fn coerce_timeout(timeout: &Timeout) -> Timeout {
    let parsed = match timeout {
        Timeout::Millis(millis) => Some(*millis as i64),
        Timeout::Raw(Value::String(text)) => parse_int(text),
        Timeout::Raw(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Timeout::Raw(_) => None,
    };

    match parsed {
        Some(millis) if millis > 0 => Timeout::Millis(millis as u64),
        _ => timeout.clone(),
    }
}

/// Base-10 `parseInt`
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
