//! Utility modules
//!
//! - **error**: crate error type
//! - **logging**: tracing subscriber setup
//! - **net**: HTTP sender, header handling and the shared client

pub mod error;
pub mod logging;
pub mod net;

pub use error::{BatchError, Result};
pub use logging::{LogFormat, init_tracing};
