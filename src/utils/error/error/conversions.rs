//! Type conversions for BatchError

use super::types::BatchError;
use crate::utils::net::TransportError;
use tokio::task::JoinError;

impl From<TransportError> for BatchError {
    fn from(err: TransportError) -> Self {
        BatchError::Transport(err.to_string())
    }
}

impl From<JoinError> for BatchError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            BatchError::TaskFailed(format!("task panicked: {}", err))
        } else {
            BatchError::TaskFailed(format!("task cancelled: {}", err))
        }
    }
}
