//! Batch data types
//!
//! Wire shapes use the camelCase keys callers already send, e.g.
//! `caseSensitiveHeaders`, `statusCode` and `HTTPStatus`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Results of one batch, keyed by request name
pub type BatchResults = BTreeMap<String, BatchOutcome>;

/// Key used for invalid requests that carry no name
pub const MISSING_NAME: &str = "missingName";

/// A single HTTP request descriptor inside a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Unique name of the request within its batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Fallback payload used when `body` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Timeout in milliseconds; strings are accepted and coerced at dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Timeout>,
    /// Client address forwarded to the remote end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Report response headers without case folding, last duplicate winning.
    /// `ReqwestSender` only ever sees lower-cased names, so with it this
    /// changes duplicate handling, not casing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive_headers: Option<bool>,
    /// Scheduling flag for repeated jobs; stripped before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<bool>,
    /// Delay between runs of a persistent job; stripped before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_delay: Option<u64>,
}

impl BatchRequest {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<Timeout>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_case_sensitive_headers(mut self, enabled: bool) -> Self {
        self.case_sensitive_headers = Some(enabled);
        self
    }

    /// Key under which this request's result is recorded
    pub fn result_key(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => MISSING_NAME,
        }
    }

    pub fn wants_case_sensitive_headers(&self) -> bool {
        self.case_sensitive_headers.unwrap_or(false)
    }

    /// Apply caller-supplied fields on top of `self` (usually the template).
    ///
    /// Scalars present in `overrides` replace ours. `headers` merge key by
    /// key. `body` and `data` deep-merge when both sides are JSON objects and
    /// are replaced otherwise.
    pub fn apply_overrides(mut self, overrides: &BatchRequest) -> Self {
        fn replace<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        replace(&mut self.name, &overrides.name);
        replace(&mut self.url, &overrides.url);
        replace(&mut self.method, &overrides.method);
        replace(&mut self.timeout, &overrides.timeout);
        replace(&mut self.ip, &overrides.ip);
        replace(
            &mut self.case_sensitive_headers,
            &overrides.case_sensitive_headers,
        );
        replace(&mut self.persistent, &overrides.persistent);
        replace(&mut self.persistent_delay, &overrides.persistent_delay);

        for (name, value) in &overrides.headers {
            self.headers.insert(name.clone(), value.clone());
        }

        merge_payload(&mut self.body, &overrides.body);
        merge_payload(&mut self.data, &overrides.data);
        self
    }
}

fn merge_payload(target: &mut Option<Value>, overlay: &Option<Value>) {
    let Some(value) = overlay else {
        return;
    };
    match target {
        Some(base) => merge_json_values(base, value),
        None => *target = Some(value.clone()),
    }
}

/// Merge `overlay` into `base`: objects merge recursively, anything else is replaced.
pub fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_json_values(base_value, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_val, overlay_val) => *base_val = overlay_val.clone(),
    }
}

/// Timeout as supplied by the caller
///
/// Plain non-negative integers are milliseconds. Anything else (numeric
/// strings, fractions) is kept raw and coerced when the task is prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timeout {
    Millis(u64),
    Raw(Value),
}

impl From<u64> for Timeout {
    fn from(millis: u64) -> Self {
        Timeout::Millis(millis)
    }
}

impl From<&str> for Timeout {
    fn from(raw: &str) -> Self {
        Timeout::Raw(Value::String(raw.to_string()))
    }
}

/// Either one request or a sequence of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchInput {
    Many(Vec<BatchRequest>),
    Single(Box<BatchRequest>),
}

impl BatchInput {
    /// Normalize into a sequence; a single request becomes a one-element batch.
    pub fn into_requests(self) -> Vec<BatchRequest> {
        match self {
            BatchInput::Many(requests) => requests,
            BatchInput::Single(request) => vec![*request],
        }
    }
}

impl From<BatchRequest> for BatchInput {
    fn from(request: BatchRequest) -> Self {
        BatchInput::Single(Box::new(request))
    }
}

impl From<Vec<BatchRequest>> for BatchInput {
    fn from(requests: Vec<BatchRequest>) -> Self {
        BatchInput::Many(requests)
    }
}

/// Normalized response of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Parsed JSON, or the raw body as a string when it is not JSON
    pub body: Value,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(rename = "HTTPStatus")]
    pub http_status: u16,
    #[serde(
        rename = "originalHeader",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_header: Option<String>,
}

/// Entry of the error-code table, recorded in place of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCode {
    pub code: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(rename = "HTTPStatus")]
    pub http_status: u16,
    pub body: String,
}

impl ResultCode {
    pub fn new(code: impl Into<String>, status_code: u16, body: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status_code,
            http_status: status_code,
            body: body.into(),
        }
    }
}

/// What a results-map entry holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Code(ResultCode),
    Response(BatchResult),
}

impl BatchOutcome {
    pub fn as_response(&self) -> Option<&BatchResult> {
        match self {
            BatchOutcome::Response(result) => Some(result),
            BatchOutcome::Code(_) => None,
        }
    }

    pub fn as_code(&self) -> Option<&ResultCode> {
        match self {
            BatchOutcome::Code(code) => Some(code),
            BatchOutcome::Response(_) => None,
        }
    }

    /// Whether this entry carries the given table code
    pub fn has_code(&self, code: &str) -> bool {
        self.as_code().is_some_and(|c| c.code == code)
    }
}

impl From<BatchResult> for BatchOutcome {
    fn from(result: BatchResult) -> Self {
        BatchOutcome::Response(result)
    }
}

impl From<ResultCode> for BatchOutcome {
    fn from(code: ResultCode) -> Self {
        BatchOutcome::Code(code)
    }
}
