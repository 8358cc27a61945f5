//! # Events emitted by the retry executor.
//!
//! The [`EventKind`] enum classifies the lifecycle of one retry execution:
//! attempts starting and finishing, retries being scheduled, and the terminal
//! transitions. The [`Event`] struct carries metadata such as timestamps,
//! task name, failure reasons, and scheduled delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events from
//! several executions interleave.
//!
//! ## Example
//! ```rust
//! use persevere::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::AttemptFailed)
//!     .with_task("sync-upstream")
//!     .with_reason("connection refused")
//!     .with_attempt(3);
//!
//! assert_eq!(ev.kind, EventKind::AttemptFailed);
//! assert_eq!(ev.task.as_deref(), Some("sync-upstream"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of retry-execution events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An attempt is starting.
    ///
    /// Sets: `task`, `attempt` (1-based), `at`, `seq`.
    AttemptStarted,

    /// An attempt produced a value; the execution is complete.
    ///
    /// Sets: `task`, `attempt`, `at`, `seq`.
    AttemptSucceeded,

    /// An attempt failed; the policy has not been consulted yet.
    ///
    /// Sets: `task`, `attempt`, `reason`, `at`, `seq`.
    AttemptFailed,

    /// The policy granted another attempt after a failure.
    ///
    /// Sets: `task`, `attempt` (completed so far), `delay_ms`, `reason`,
    /// `at`, `seq`.
    RetryScheduled,

    /// The policy signalled stop; the execution failed terminally.
    ///
    /// Sets: `task`, `attempt`, `reason` (last failure), `at`, `seq`.
    RetriesExhausted,

    /// The caller cancelled the execution.
    ///
    /// Sets: `task`, `at`, `seq`.
    ExecutionCanceled,
}

/// Retry-execution event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Attempt count the event refers to.
    pub attempt: Option<u32>,
    /// Delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (failure messages, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a retry delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let a = Event::new(EventKind::AttemptStarted);
        let b = Event::new(EventKind::AttemptFailed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::new(EventKind::RetryScheduled)
            .with_task("demo")
            .with_attempt(2)
            .with_delay(Duration::from_millis(150))
            .with_reason("boom");
        assert_eq!(ev.task.as_deref(), Some("demo"));
        assert_eq!(ev.attempt, Some(2));
        assert_eq!(ev.delay_ms, Some(150));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
