//! Request batching
//!
//! A batch is validated against the configured request template, dispatched
//! with a bounded number of calls in flight, and every outcome is normalized
//! into one mapping from request name to result.

mod dispatcher;
mod error_codes;
mod normalizer;
mod transport;
mod types;
mod validator;


// Re-export all public types
pub use dispatcher::{Dispatcher, FORWARDED_FOR_HEADER, coerce_timeout, parse_int, prepare_request};
pub use error_codes::{ERROR_API_URL, ErrorCodeTable, INVALID_TASK};
pub use normalizer::{ResponseNormalizer, parse_body};
pub use transport::{Batcher, Pipeline, Transport};
pub use types::{
    BatchInput, BatchOutcome, BatchRequest, BatchResult, BatchResults, MISSING_NAME, ResultCode,
    Timeout, merge_json_values,
};
pub use validator::{
    DefaultValidator, RequestValidator, ValidatedBatch, resolve_method, validate_requests,
};
