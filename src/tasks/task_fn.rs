//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per attempt. Each attempt owns its own state; shared state
//! across attempts must be captured explicitly (`Arc<...>`) inside the
//! closure.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new attempt future per call.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use persevere::{TaskFn, TaskRef, TaskError};
///
/// let t: TaskRef<u32> = TaskFn::arc("answer", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(42u32)
/// });
///
/// assert_eq!(t.name(), "answer");
/// ```
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, V> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, TaskError>> + Send + 'static,
    V: Send + 'static,
{
    type Output = V;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<V, TaskError> {
        (self.f)(ctx).await
    }
}
