//! Core functionality
//!
//! Batch execution and job bookkeeping.

pub mod batch;
pub mod jobs;

pub use batch::{
    BatchInput, BatchOutcome, BatchRequest, BatchResult, BatchResults, Batcher, Transport,
};
pub use jobs::{JobHolder, JobHolderConfig, JobStats};
