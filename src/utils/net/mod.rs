//! Network utilities
//!
//! This module provides the HTTP-send capability used by the batcher, the
//! shared `reqwest` client behind the default sender, and header helpers.

pub mod headers;
pub mod http;
pub mod sender;

// Re-export commonly used types and functions
pub use headers::HeaderPairs;
pub use http::{HttpClientPoolConfig, ReqwestSender, get_shared_client};
pub use sender::{HttpSender, PreparedRequest, RawResponse, TransportError, TransportErrorKind};
