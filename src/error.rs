//! Error types shared by every primitive in the crate.
//!
//! The taxonomy is deliberately small:
//!
//! - [`TaskError::Cancelled`] / [`TaskError::DeadlineExceeded`] are produced
//!   when a [`Context`](crate::Context) fires; primitives that wait on a token
//!   surface them.
//! - [`TaskError::Panicked`] is produced when a spawned task dies before
//!   reporting its outcome. Panics are contained and returned as errors;
//!   nothing in this crate aborts the process.
//! - [`TaskError::Other`] carries a user task's own error through unmodified.
//!
//! All variants are cheap to clone so that cached outcomes
//! ([`Promise`](crate::Promise), [`OnceTask`](crate::OnceTask)) can be
//! replayed to every observer.

use std::sync::Arc;

use thiserror::Error;

/// Outcome of a single task invocation.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors produced by, or passed through, the concurrency primitives.
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// The cancellation token was cancelled before or during the operation.
    #[error("operation cancelled")]
    Cancelled,
    /// The cancellation token's deadline elapsed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// A spawned task panicked (or was torn down) before reporting.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// A user work function failed; the error is passed through unmodified.
    #[error("{0}")]
    Other(Arc<anyhow::Error>),
}

impl TaskError {
    /// Wrap an arbitrary error as a task error.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Other(Arc::new(err.into()))
    }

    /// Build a task error from a plain message.
    #[must_use]
    pub fn msg(msg: impl Into<String>) -> Self {
        Self::Other(Arc::new(anyhow::Error::msg(msg.into())))
    }

    /// True for [`TaskError::Cancelled`] and [`TaskError::DeadlineExceeded`].
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(Arc::new(err))
    }
}

/// Flatten a join result into the task's outcome, mapping a panicked or
/// aborted task to [`TaskError::Panicked`].
pub(crate) fn join_outcome<T>(
    joined: Result<TaskResult<T>, tokio::task::JoinError>,
) -> TaskResult<T> {
    match joined {
        Ok(outcome) => outcome,
        Err(err) => Err(TaskError::Panicked(err.to_string())),
    }
}
