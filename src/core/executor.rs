//! # The retry attempt loop.
//!
//! Drives one task through repeated attempts according to a
//! [`RetryPolicy`], producing a [`RetryFuture`].
//!
//! ## Flow
//! ```text
//! execute(task)
//!   ├─► initial = policy.delay(0, None), clamped to zero
//!   ├─► scheduler.schedule_after(initial, attempt #1)
//!   └─► return RetryFuture (pending)
//!
//! attempt #n:
//!   ├─► cancelled? ─► no-op (the cancel path already finalized the future)
//!   ├─► task.run(ctx)
//!   │     ├─ Ok(v)   ─► finalize Ok(v)
//!   │     └─ Err(e)  ─► attempts += 1
//!   │          ├─ policy.delay(attempts, Some(&e)) = Some(d)
//!   │          │    ─► suppress e, update advisory delay,
//!   │          │       schedule attempt #n+1 after d
//!   │          └─ None ─► finalize Err(Exhausted { e, history })
//! ```
//!
//! ## Rules
//! - Attempts are strictly sequential: the next one is scheduled only from
//!   the completion path of the previous one.
//! - The attempt counter and suppressed-failure list are moved into each
//!   scheduled closure; the running attempt is their sole owner.
//! - No failure is ever dropped: exhaustion surfaces the last error with the
//!   full history attached, most recent first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::core::future::{RetryFuture, Shared};
use crate::error::{RetryError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::RetryPolicy;
use crate::schedulers::{InlineScheduler, ScheduledWork, Scheduler};
use crate::tasks::Task;

/// Ring-buffer size of the per-execution event bus.
const EVENT_BUS_CAPACITY: usize = 64;

impl RetryPolicy {
    /// Executes the task on the default same-thread scheduler, retrying
    /// failures according to this policy.
    ///
    /// With [`InlineScheduler`] the whole retry chain runs in the calling
    /// thread before this returns, so the returned future is already
    /// terminal. Pass a [`TokioScheduler`](crate::TokioScheduler) via
    /// [`execute_with`](RetryPolicy::execute_with) for deferred execution.
    ///
    /// # Example
    /// ```rust
    /// use std::sync::atomic::{AtomicU32, Ordering};
    /// use std::sync::Arc;
    /// use tokio_util::sync::CancellationToken;
    /// use persevere::{RetryPolicy, TaskError, TaskFn};
    ///
    /// let calls = Arc::new(AtomicU32::new(0));
    /// let counter = calls.clone();
    /// let task = TaskFn::arc("flaky", move |_ctx: CancellationToken| {
    ///     let counter = counter.clone();
    ///     async move {
    ///         if counter.fetch_add(1, Ordering::SeqCst) < 2 {
    ///             Err(TaskError::Fail { error: "not yet".into() })
    ///         } else {
    ///             Ok("done")
    ///         }
    ///     }
    /// });
    ///
    /// let result = RetryPolicy::continuously().limit(5).execute(task).wait();
    /// assert_eq!(result.unwrap(), "done");
    /// assert_eq!(calls.load(Ordering::SeqCst), 3);
    /// ```
    pub fn execute<T>(&self, task: Arc<T>) -> RetryFuture<T::Output>
    where
        T: Task + ?Sized,
    {
        self.execute_with(task, Arc::new(InlineScheduler::new()))
    }

    /// Executes the task using the given scheduler, retrying failures
    /// according to this policy.
    ///
    /// Returns immediately after scheduling the first attempt (for deferring
    /// schedulers); waiting for the result is a separate operation on the
    /// returned [`RetryFuture`].
    pub fn execute_with<T>(
        &self,
        task: Arc<T>,
        scheduler: Arc<dyn Scheduler>,
    ) -> RetryFuture<T::Output>
    where
        T: Task + ?Sized,
    {
        let (tx, rx) = oneshot::channel();
        let shared = Arc::new(Shared::new(
            self.clone(),
            Bus::new(EVENT_BUS_CAPACITY),
            task.name(),
            tx,
        ));

        // The initial consultation happens before the task has failed, so a
        // "stop" answer cannot be honored; clamp it and run the first attempt.
        let initial = self.delay(0, None).unwrap_or(Duration::ZERO);
        shared.set_delay(initial);

        let first = attempt(task, shared.clone(), scheduler.clone(), 0, Vec::new());
        let handle = scheduler.schedule_after(initial, first);
        shared.set_pending(handle);

        RetryFuture::new(shared, rx)
    }
}

/// Builds the boxed closure for one attempt.
///
/// `attempts` counts completed attempts so far; `suppressed` carries every
/// prior failure in occurrence order. Both are owned by the attempt while it
/// runs and move into the next attempt's closure on reschedule.
fn attempt<T>(
    task: Arc<T>,
    shared: Arc<Shared<T::Output>>,
    scheduler: Arc<dyn Scheduler>,
    attempts: u32,
    mut suppressed: Vec<TaskError>,
) -> ScheduledWork
where
    T: Task + ?Sized,
{
    Box::pin(async move {
        // A cancellation may have raced with this firing; the cancel path
        // already finalized the future, so the attempt becomes a no-op.
        if shared.is_cancelled() {
            return;
        }

        shared.bus().publish(
            Event::new(EventKind::AttemptStarted)
                .with_task(shared.name())
                .with_attempt(attempts + 1),
        );

        match task.run(shared.interrupt_token()).await {
            Ok(value) => {
                shared.bus().publish(
                    Event::new(EventKind::AttemptSucceeded)
                        .with_task(shared.name())
                        .with_attempt(attempts + 1),
                );
                shared.complete(Ok(value));
            }
            Err(err) => {
                let attempts = attempts + 1;
                shared.bus().publish(
                    Event::new(EventKind::AttemptFailed)
                        .with_task(shared.name())
                        .with_attempt(attempts)
                        .with_reason(err.to_string()),
                );

                match shared.policy().delay(attempts, Some(&err)) {
                    Some(delay) => {
                        shared.set_delay(delay);
                        shared.bus().publish(
                            Event::new(EventKind::RetryScheduled)
                                .with_task(shared.name())
                                .with_attempt(attempts)
                                .with_delay(delay)
                                .with_reason(err.to_string()),
                        );
                        suppressed.push(err);
                        let next = attempt(
                            Arc::clone(&task),
                            Arc::clone(&shared),
                            Arc::clone(&scheduler),
                            attempts,
                            suppressed,
                        );
                        let handle = scheduler.schedule_after(delay, next);
                        shared.set_pending(handle);
                    }
                    None => {
                        shared.bus().publish(
                            Event::new(EventKind::RetriesExhausted)
                                .with_task(shared.name())
                                .with_attempt(attempts)
                                .with_reason(err.to_string()),
                        );
                        suppressed.reverse(); // most recent first
                        shared.complete(Err(RetryError::Exhausted {
                            attempts,
                            cause: err,
                            suppressed,
                        }));
                    }
                }
            }
        }
    })
}
