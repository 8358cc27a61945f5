//! # Tokio-backed scheduler.
//!
//! [`TokioScheduler`] defers work to the ambient tokio runtime: each
//! `schedule_after` call spawns a task that sleeps for the delay and then
//! runs the work. Cancellation races the sleep/work future in a `select!`,
//! so a not-yet-started invocation is skipped and a started one is dropped at
//! its next await point.

use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use super::{ScheduleHandle, ScheduledWork, Scheduler};

/// Scheduler backed by `tokio::spawn` and `tokio::time::sleep`.
///
/// Must be used from within a tokio runtime; `schedule_after` panics
/// otherwise (this is `tokio::spawn`'s contract). Safe to share across any
/// number of concurrent retry executions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_after(&self, delay: Duration, work: ScheduledWork) -> ScheduleHandle {
        let token = CancellationToken::new();
        let guard = token.clone();
        tokio::spawn(async move {
            let fire = async move {
                if delay > Duration::ZERO {
                    time::sleep(delay).await;
                }
                work.await;
            };
            tokio::pin!(fire);
            select! {
                _ = &mut fire => {}
                _ = guard.cancelled() => {}
            }
        });
        ScheduleHandle::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_work_after_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        TokioScheduler.schedule_after(
            Duration::from_millis(5),
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
            }),
        );
        time::sleep(Duration::from_millis(50)).await;
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancel_prevents_pending_work() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let handle = TokioScheduler.schedule_after(
            Duration::from_millis(30),
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
            }),
        );
        handle.cancel();
        assert!(handle.is_cancelled());
        time::sleep(Duration::from_millis(80)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }
}
