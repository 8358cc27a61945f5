//! # Pluggable scheduling capability.
//!
//! The retry executor does not own a timer; it asks a [`Scheduler`] to invoke
//! a piece of work once, no sooner than a requested delay. Two
//! implementations ship with the crate:
//!
//! - [`InlineScheduler`] — zero-setup default; blocks the calling thread for
//!   the delay and runs the work synchronously.
//! - [`TokioScheduler`] — defers to the tokio runtime via `spawn` + `sleep`.
//!
//! A scheduler may be shared across any number of unrelated retry
//! executions; `schedule_after` must invoke the given work exactly once at or
//! after the requested delay, unless the returned handle is cancelled first.

mod inline;
mod spawn;

use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

pub use inline::InlineScheduler;
pub use spawn::TokioScheduler;

/// Unit of work handed to a scheduler: one boxed attempt future.
pub type ScheduledWork = BoxFuture<'static, ()>;

/// Capability for delayed, cancellable invocation.
pub trait Scheduler: Send + Sync + 'static {
    /// Invokes `work` once, no sooner than `delay` after the call.
    ///
    /// Cancelling the returned handle prevents an invocation that has not
    /// started yet; stopping one that is already running is best-effort and
    /// implementation-specific.
    fn schedule_after(&self, delay: Duration, work: ScheduledWork) -> ScheduleHandle;
}

/// Cancellation handle for one scheduled invocation.
///
/// Cloning the handle shares the same underlying cancellation state.
#[derive(Clone, Debug)]
pub struct ScheduleHandle {
    token: CancellationToken,
}

impl ScheduleHandle {
    /// Wraps a cancellation token into a handle.
    ///
    /// Scheduler implementations observe the token to skip or stop the
    /// scheduled work.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Requests cancellation of the scheduled invocation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
