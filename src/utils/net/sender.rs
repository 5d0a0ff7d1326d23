//! HTTP-send capability
//!
//! The batcher never talks to an HTTP client directly. Every prepared request
//! goes through an [`HttpSender`], which reports either a transport-level
//! failure or a response with its raw headers and body.

use super::headers::HeaderPairs;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// A request that passed preparation and is ready to go on the wire
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Name of the request inside its batch
    pub name: String,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Per-request timeout, enforced by the sender
    pub timeout: Option<Duration>,
}

/// What came back from the remote end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status_code: u16,
    pub raw_headers: HeaderPairs,
    pub body: String,
}

impl RawResponse {
    pub fn new(status_code: u16, raw_headers: HeaderPairs, body: impl Into<String>) -> Self {
        Self {
            status_code,
            raw_headers,
            body: body.into(),
        }
    }
}

/// Classification of transport-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    Timeout,
    SocketTimeout,
    ConnectionRefused,
    ConnectionReset,
    HostNotFound,
    Other,
}

impl TransportErrorKind {
    /// Key used to look the failure up in the error-code table
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "ETIMEDOUT",
            Self::SocketTimeout => "ESOCKETTIMEDOUT",
            Self::ConnectionRefused => "ECONNREFUSED",
            Self::ConnectionReset => "ECONNRESET",
            Self::HostNotFound => "ENOTFOUND",
            Self::Other => "EUNKNOWN",
        }
    }
}

/// A failure before any response was received
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({})", .kind.code())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn connection_refused(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ConnectionRefused, message)
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Failure while reading a response body after the headers arrived.
    ///
    /// A timeout at this point is a stalled socket, not a slow server.
    pub fn from_body_read(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(TransportErrorKind::SocketTimeout, err.to_string())
        } else {
            err.into()
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            classify_connect_error(&err)
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, err.to_string())
    }
}

/// Walk the source chain of a connect error to find out what went wrong.
fn classify_connect_error(err: &(dyn StdError + 'static)) -> TransportErrorKind {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => {
                    return TransportErrorKind::ConnectionRefused;
                }
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::ConnectionAborted => {
                    return TransportErrorKind::ConnectionReset;
                }
                std::io::ErrorKind::TimedOut => return TransportErrorKind::Timeout,
                _ => {}
            }
        }
        let text = current.to_string().to_ascii_lowercase();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return TransportErrorKind::HostNotFound;
        }
        source = current.source();
    }
    TransportErrorKind::Other
}

/// Sends one prepared request
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}
