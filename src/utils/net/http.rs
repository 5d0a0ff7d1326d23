//! Shared HTTP client and the default `HttpSender`
//!
//! A single `reqwest` client is shared by every batch so connections and DNS
//! lookups are reused. Per-request timeouts are applied on the request
//! builder, so one client serves all timeout values.
//!
//! # Usage
//!
//! ```rust,ignore
//! use batchelor_rs::utils::net::ReqwestSender;
//!
//! let sender = ReqwestSender::new();
//! let response = sender.send(prepared).await?;
//! ```

use super::headers::HeaderPairs;
use super::sender::{HttpSender, PreparedRequest, RawResponse, TransportError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP client pool
#[derive(Debug, Clone)]
pub struct HttpClientPoolConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// TCP keepalive interval
    pub tcp_keepalive: Duration,
    /// User agent string
    pub user_agent: &'static str,
}

impl Default for HttpClientPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 100,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(60),
            user_agent: concat!("batchelor-rs/", env!("CARGO_PKG_VERSION")),
        }
    }
}

static SHARED_HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Get the shared HTTP client instance
///
/// The shared client has no overall timeout; each request carries its own.
pub fn get_shared_client() -> &'static Client {
    SHARED_HTTP_CLIENT.get_or_init(|| {
        debug!("Initializing shared HTTP client");
        client_builder(&HttpClientPoolConfig::default())
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    "Failed to create pooled HTTP client, falling back to default: {}",
                    e
                );
                Client::new()
            })
    })
}

fn client_builder(config: &HttpClientPoolConfig) -> ClientBuilder {
    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(config.pool_idle_timeout)
        .connect_timeout(config.connect_timeout)
        .tcp_keepalive(config.tcp_keepalive)
        .tcp_nodelay(true)
        .user_agent(config.user_agent)
}

/// `HttpSender` backed by `reqwest`
///
/// `reqwest` lower-cases header names on receipt, so the raw header pairs it
/// reports keep duplicates and arrival order but not the original casing.
/// A timeout while the body is still streaming is reported as
/// `ESOCKETTIMEDOUT`; any earlier timeout is `ETIMEDOUT`.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    /// Sender using the shared client
    pub fn new() -> Self {
        Self {
            client: get_shared_client().clone(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status_code = response.status().as_u16();
        let raw_headers = HeaderPairs::from_header_map(response.headers());
        let body = response
            .text()
            .await
            .map_err(TransportError::from_body_read)?;

        Ok(RawResponse {
            status_code,
            raw_headers,
            body,
        })
    }
}
