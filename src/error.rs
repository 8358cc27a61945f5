//! Error types used by the retry engine and tasks.
//!
//! This module defines two error enums and a classification type:
//!
//! - [`TaskError`] — errors raised by individual task attempts.
//! - [`RetryError`] — the terminal failure of a whole retry execution.
//! - [`TaskErrorKind`] — `Copy`/`Eq` classification of a [`TaskError`],
//!   used by kind-based retry predicates.
//!
//! A retry execution never drops a failure: every failed attempt's error is
//! retained, and on exhaustion the final [`RetryError::Exhausted`] carries the
//! full history as suppressed causes.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by task execution.
///
/// These represent failures of a single attempt of an async task.
/// Some errors are retryable (`Timeout`, `Fail`), others are considered fatal.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Non-recoverable fatal error (should not be retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// Task execution failed but may succeed if retried.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled via its [`CancellationToken`](tokio_util::sync::CancellationToken).
    #[error("attempt cancelled")]
    Canceled,
}

impl TaskError {
    /// Returns the classification of this error.
    ///
    /// # Example
    /// ```
    /// use persevere::{TaskError, TaskErrorKind};
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.kind(), TaskErrorKind::Fail);
    /// ```
    pub fn kind(&self) -> TaskErrorKind {
        match self {
            TaskError::Timeout { .. } => TaskErrorKind::Timeout,
            TaskError::Fatal { .. } => TaskErrorKind::Fatal,
            TaskError::Fail { .. } => TaskErrorKind::Fail,
            TaskError::Canceled => TaskErrorKind::Canceled,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// Returns `true` for [`TaskError::Fail`] and [`TaskError::Timeout`],
    /// `false` otherwise. Pairs naturally with
    /// [`RetryPolicy::when`](crate::RetryPolicy::when):
    ///
    /// ```
    /// use persevere::{RetryPolicy, TaskError};
    ///
    /// let policy = RetryPolicy::continuously()
    ///     .limit(3)
    ///     .when(|cause| cause.map_or(true, TaskError::is_retryable));
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::Fail { .. } | TaskError::Timeout { .. })
    }
}

/// Classification of a [`TaskError`], independent of its payload.
///
/// Used by [`RetryPolicy::when_kind`](crate::RetryPolicy::when_kind) to retry
/// only on a particular failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// An attempt exceeded its timeout.
    Timeout,
    /// A non-recoverable error.
    Fatal,
    /// A recoverable execution failure.
    Fail,
    /// The attempt was cancelled.
    Canceled,
}

/// # Terminal failure of a retry execution.
///
/// Returned by awaiting a [`RetryFuture`](crate::RetryFuture) when the
/// execution did not produce a value.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError {
    /// The delay policy signalled stop after the last failure.
    ///
    /// `cause` is the most recent attempt's error; `suppressed` holds every
    /// earlier attempt's error, most recent first.
    #[error("retries exhausted after {attempts} attempt(s): {cause}")]
    Exhausted {
        /// Number of completed (failed) attempts.
        attempts: u32,
        /// The last attempt's failure.
        cause: TaskError,
        /// Prior failures, most recent first.
        suppressed: Vec<TaskError>,
    },

    /// The execution was cancelled before reaching a value or exhaustion.
    ///
    /// Carries no failure cause; cancellation is a distinct terminal state.
    #[error("retry execution cancelled")]
    Canceled,
}

impl RetryError {
    /// Returns `true` if this is the cancellation terminal state.
    pub fn is_canceled(&self) -> bool {
        matches!(self, RetryError::Canceled)
    }

    /// The last attempt's failure, if retries were exhausted.
    pub fn cause(&self) -> Option<&TaskError> {
        match self {
            RetryError::Exhausted { cause, .. } => Some(cause),
            RetryError::Canceled => None,
        }
    }

    /// Failures of earlier attempts, most recent first.
    ///
    /// Empty for [`RetryError::Canceled`] and for an exhaustion after a
    /// single attempt.
    pub fn suppressed(&self) -> &[TaskError] {
        match self {
            RetryError::Exhausted { suppressed, .. } => suppressed,
            RetryError::Canceled => &[],
        }
    }
}
