//! # Same-thread scheduler.
//!
//! [`InlineScheduler`] executes scheduled work in the thread that requested
//! it: `schedule_after` sleeps for the delay, runs the work to completion via
//! [`futures::executor::block_on`], and only then returns. No runtime or
//! extra threads are required, which makes it the zero-setup default for
//! [`RetryPolicy::execute`](crate::RetryPolicy::execute) and for synchronous
//! tests.
//!
//! ## Re-entrancy
//! The retry executor reschedules itself from *inside* a running attempt.
//! A naive inline implementation would call `block_on` recursively, which
//! `futures`' executor forbids. Instead, every request lands on an internal
//! run-queue; the outermost `schedule_after` call drains the queue (earliest
//! due time first) until it is empty, so exactly one `block_on` is active at
//! a time. Work enqueued by another thread while a drain is in progress is
//! executed by the draining thread.
//!
//! ## Caveats
//! - Work runs to completion before the outermost `schedule_after` returns;
//!   "scheduling" the first attempt of a retry chain therefore runs the whole
//!   chain.
//! - Futures that need a live reactor (tokio timers, I/O) will stall here;
//!   use [`TokioScheduler`](crate::TokioScheduler) for those.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::{ScheduleHandle, ScheduledWork, Scheduler};

/// One queued invocation.
struct Entry {
    due: Instant,
    token: CancellationToken,
    work: ScheduledWork,
}

/// Scheduler that runs work in the calling thread, sleeping for delays.
///
/// Share one instance per group of executions that should serialize on the
/// same queue; a fresh instance is created by
/// [`RetryPolicy::execute`](crate::RetryPolicy::execute) for each execution.
#[derive(Default)]
pub struct InlineScheduler {
    queue: Mutex<VecDeque<Entry>>,
    draining: AtomicBool,
}

impl InlineScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_queue(&self) -> MutexGuard<'_, VecDeque<Entry>> {
        // A panicking work item must not wedge the queue.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Runs queued entries, earliest due time first, until the queue is empty.
    fn drain(&self) {
        loop {
            let entry = {
                let mut queue = self.lock_queue();
                let next = queue
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, e)| e.due)
                    .map(|(i, _)| i);
                match next {
                    Some(i) => queue.remove(i),
                    None => None,
                }
            };
            let Some(entry) = entry else { break };
            if entry.token.is_cancelled() {
                continue;
            }
            let now = Instant::now();
            if entry.due > now {
                thread::sleep(entry.due - now);
            }
            if entry.token.is_cancelled() {
                continue;
            }
            futures::executor::block_on(entry.work);
        }
    }
}

impl Scheduler for InlineScheduler {
    fn schedule_after(&self, delay: Duration, work: ScheduledWork) -> ScheduleHandle {
        let token = CancellationToken::new();
        self.lock_queue().push_back(Entry {
            due: Instant::now() + delay,
            token: token.clone(),
            work,
        });

        // Only the outermost call on this instance drains; re-entrant and
        // concurrent calls just enqueue. Re-check after releasing the flag so
        // an entry enqueued in that window is not stranded.
        while !self.draining.swap(true, Ordering::AcqRel) {
            self.drain();
            self.draining.store(false, Ordering::Release);
            if self.lock_queue().is_empty() {
                break;
            }
        }

        ScheduleHandle::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    #[test]
    fn runs_work_before_returning() {
        let ran = Arc::new(AtomicU32::new(0));
        let flag = ran.clone();
        let sched = InlineScheduler::new();
        sched.schedule_after(
            Duration::ZERO,
            Box::pin(async move {
                flag.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn honors_positive_delay() {
        let sched = InlineScheduler::new();
        let start = Instant::now();
        sched.schedule_after(Duration::from_millis(20), Box::pin(async {}));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn reentrant_scheduling_does_not_nest_block_on() {
        // Work that schedules more work, like the retry chain does.
        let sched = Arc::new(InlineScheduler::new());
        let count = Arc::new(AtomicU32::new(0));

        let inner_sched = sched.clone();
        let inner_count = count.clone();
        sched.schedule_after(
            Duration::ZERO,
            Box::pin(async move {
                inner_count.fetch_add(1, Ordering::SeqCst);
                let innermost_count = inner_count.clone();
                inner_sched.schedule_after(
                    Duration::ZERO,
                    Box::pin(async move {
                        innermost_count.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancelled_entries_are_skipped() {
        // Cancellation can only be observed for entries still in the queue,
        // so cancel from inside an earlier work item.
        let sched = Arc::new(InlineScheduler::new());
        let ran = Arc::new(AtomicU32::new(0));

        let inner_sched = sched.clone();
        let inner_ran = ran.clone();
        sched.schedule_after(
            Duration::ZERO,
            Box::pin(async move {
                let flag = inner_ran.clone();
                let handle = inner_sched.schedule_after(
                    Duration::from_millis(5),
                    Box::pin(async move {
                        flag.fetch_add(1, Ordering::SeqCst);
                    }),
                );
                handle.cancel();
            }),
        );
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
