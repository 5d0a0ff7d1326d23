//! In-memory sender for driving whole batches without a network

use async_trait::async_trait;
use batchelor_rs::utils::net::{HeaderPairs, TransportErrorKind};
use batchelor_rs::{HttpSender, PreparedRequest, RawResponse, TransportError};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted reply for one URL
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Fail(TransportErrorKind),
}

/// Records every request and the peak number of concurrent calls.
///
/// Unscripted URLs answer 200 with `{"name": <request name>}`.
#[derive(Default)]
pub struct RecordingSender {
    delay: Duration,
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.name.clone()).collect()
    }
}

#[async_trait]
impl HttpSender for RecordingSender {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let url = request.url.to_string();
        let name = request.name.clone();
        self.requests.lock().push(request);

        let delay = self.delays.get(&url).copied().unwrap_or(self.delay);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&url) {
            Some(Reply::Fail(kind)) => Err(TransportError::new(*kind, "scripted failure")),
            Some(Reply::Status(status, body)) => Ok(RawResponse::new(
                *status,
                HeaderPairs::from_flat(&["Content-Type", "application/json"]),
                body.clone(),
            )),
            None => Ok(RawResponse::new(
                200,
                HeaderPairs::from_flat(&["Content-Type", "application/json"]),
                json!({ "name": name }).to_string(),
            )),
        }
    }
}
