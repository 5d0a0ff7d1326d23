//! # batchelor-rs
//!
//! Issue a batch of named HTTP requests with bounded concurrency and get back
//! one normalized result per name.
//!
//! ## Features
//!
//! - **Validation**: each request is laid over a configurable template and
//!   checked before anything goes on the wire
//! - **Bounded dispatch**: at most `maxConcurrentBatches` calls in flight
//! - **Uniform results**: responses, invalid requests and transport failures
//!   all land in the same name-keyed mapping
//! - **Pluggable transport**: swap the whole pipeline for tests or other
//!   backends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batchelor_rs::{BatchRequest, Batcher, BatcherConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let batcher = Batcher::new(BatcherConfig::default().with_max_concurrent_batches(4))?;
//!
//!     let results = batcher
//!         .issue_calls(vec![
//!             BatchRequest::new("user", "https://api.example.com/users/1"),
//!             BatchRequest::new("orders", "https://api.example.com/orders?user=1")
//!                 .with_header("Accept", "application/json"),
//!         ])
//!         .await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&results)?);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

pub use config::{BatcherConfig, ResultCodeConfig};
pub use crate::core::batch::{
    BatchInput, BatchOutcome, BatchRequest, BatchResult, BatchResults, Batcher, DefaultValidator,
    ERROR_API_URL, ErrorCodeTable, INVALID_TASK, MISSING_NAME, RequestValidator, ResultCode,
    Timeout, Transport,
};
pub use crate::core::jobs::{JobHolder, JobHolderConfig, JobStats};
pub use utils::error::{BatchError, Result};
pub use utils::net::{HttpSender, PreparedRequest, RawResponse, ReqwestSender, TransportError};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
