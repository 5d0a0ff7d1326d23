//! Error handling utilities
//!
//! This module provides the error types shared by the batching pipeline,
//! the configuration layer and the command line entry point.

pub mod error;

// Re-export commonly used types
pub use error::*;
