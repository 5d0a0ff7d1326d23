//! Helper functions for creating specific error types

use super::types::BatchError;

impl BatchError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn preparation<N: Into<String>, S: Into<String>>(name: N, message: S) -> Self {
        Self::Preparation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn task_failed<S: Into<String>>(message: S) -> Self {
        Self::TaskFailed(message.into())
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Whether this error aborted a batch after dispatch had started
    pub fn is_batch_abort(&self) -> bool {
        matches!(self, Self::Preparation { .. } | Self::TaskFailed(_))
    }
}
