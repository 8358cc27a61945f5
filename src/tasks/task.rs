//! # Task trait and shared handle type.
//!
//! A task is an async, cancellable unit of work producing a typed value. It
//! receives a [`CancellationToken`] and should periodically check it to stop
//! cooperatively when the caller cancels the retry execution in interrupt
//! mode.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a task producing values of type `V`.
pub type TaskRef<V> = Arc<dyn Task<Output = V>>;

/// # Asynchronous, cancellable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run)
/// method that receives a [`CancellationToken`]. The retry executor calls
/// `run` once per attempt; each attempt must produce a fresh value of
/// [`Output`](Task::Output) or fail with a [`TaskError`].
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use persevere::{Task, TaskError};
///
/// struct Fetch;
///
/// #[async_trait]
/// impl Task for Fetch {
///     type Output = String;
///
///     fn name(&self) -> &str { "fetch" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<String, TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         Ok("payload".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// The value produced by a successful attempt.
    type Output: Send + 'static;

    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes one attempt until completion or cancellation.
    ///
    /// Implementations should check `ctx.is_cancelled()` at convenient points
    /// and return [`TaskError::Canceled`] promptly when interrupted.
    async fn run(&self, ctx: CancellationToken) -> Result<Self::Output, TaskError>;
}
