//! # Composable delay policy.
//!
//! [`RetryPolicy`] is a pure decision value: given the number of completed
//! attempts and the last failure, it answers with the delay before the next
//! attempt, or `None` to stop retrying.
//!
//! Policies are immutable; the [`limit`](RetryPolicy::limit) and
//! [`when`](RetryPolicy::when) decorators wrap an existing policy in a new
//! value and delegate to it, so composed layers share no mutable state.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use persevere::RetryPolicy;
//!
//! let policy = RetryPolicy::with_exponential_backoff(Duration::from_millis(100)).limit(4);
//!
//! // Attempt 0 — the pre-first-attempt delay: 1 × 100ms
//! assert_eq!(policy.delay(0, None), Some(Duration::from_millis(100)));
//!
//! // Attempt 2 — 4 × 100ms
//! assert_eq!(policy.delay(2, None), Some(Duration::from_millis(400)));
//!
//! // Attempt 5 — beyond the limit, stop
//! assert_eq!(policy.delay(5, None), None);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{TaskError, TaskErrorKind};

/// Shared predicate over the cause of the last failure.
///
/// The cause is `None` on the pre-first-attempt invocation (the task has not
/// run yet); predicates must handle that case.
pub type FailurePredicate = Arc<dyn Fn(Option<&TaskError>) -> bool + Send + Sync>;

/// Largest exponent accepted by the exponential policy before it stops.
const MAX_EXPONENT: u32 = 62;

/// Composable delay policy.
///
/// Decides, after each completed attempt, whether to retry and how long to
/// wait first. `Some(delay)` schedules the next attempt, `None` stops the
/// execution and surfaces the accumulated failure.
///
/// ### Attempt indexing
/// Attempt 0 is the *first* execution of the task, which has not failed yet:
/// the executor consults `delay(0, None)` to compute the initial scheduling
/// delay, then `delay(n, Some(&err))` after the n-th failure (1-based).
#[non_exhaustive]
#[derive(Clone)]
pub enum RetryPolicy {
    /// Permit exactly one attempt, never retry.
    None,
    /// Retry immediately, without any delay or limit.
    Continuously,
    /// Retry periodically with a fixed delay.
    Every {
        /// Fixed delay between attempts.
        period: Duration,
    },
    /// Retry with linearly increasing delays (`attempts × period`).
    Linear {
        /// Delay increment per completed attempt.
        period: Duration,
    },
    /// Retry with exponentially increasing delays (`2^attempts × period`).
    Exponential {
        /// Delay before the first attempt; doubles after each failure.
        period: Duration,
    },
    /// Decorator: delegate to `inner` for at most `max + 1` executions.
    Limit {
        /// The wrapped policy.
        inner: Arc<RetryPolicy>,
        /// Maximum attempt index that is still delegated (`attempts <= max`).
        max: u32,
    },
    /// Decorator: delegate to `inner` only if the predicate accepts the cause.
    When {
        /// The wrapped policy.
        inner: Arc<RetryPolicy>,
        /// Predicate deciding whether this failure is worth retrying.
        predicate: FailurePredicate,
    },
}

impl RetryPolicy {
    /// A policy which does not actually retry at all.
    ///
    /// Permits the single initial attempt (`delay(0, _)` is zero) and rejects
    /// everything after it.
    pub fn none() -> Self {
        RetryPolicy::None
    }

    /// A policy which retries continuously, without any delay or limit.
    pub fn continuously() -> Self {
        RetryPolicy::Continuously
    }

    /// A policy which retries periodically with the given fixed delay.
    pub fn every(period: Duration) -> Self {
        RetryPolicy::Every { period }
    }

    /// A policy whose delay grows by one extra `period` after each attempt:
    /// 0, `period`, 2×`period`, …
    pub fn with_linear_backoff(period: Duration) -> Self {
        RetryPolicy::Linear { period }
    }

    /// A policy whose delay doubles after each attempt:
    /// `period`, 2×`period`, 4×`period`, …
    ///
    /// Stops once the attempt count exceeds 62, where the doubling factor
    /// would overflow.
    pub fn with_exponential_backoff(period: Duration) -> Self {
        RetryPolicy::Exponential { period }
    }

    /// Extends the policy to permit at most `n + 1` executions.
    ///
    /// Delegates to the wrapped policy while `attempts <= n`; beyond that it
    /// stops unconditionally. Attempt 0 is the first execution, so `limit(n)`
    /// allows the initial attempt plus `n` retries.
    pub fn limit(self, n: u32) -> Self {
        RetryPolicy::Limit {
            inner: Arc::new(self),
            max: n,
        }
    }

    /// Extends the policy to retry only if the failure satisfies `predicate`.
    ///
    /// The predicate receives `None` on the pre-first-attempt invocation; the
    /// executor clamps a rejected initial delay to zero, so the first attempt
    /// still runs regardless of what the predicate answers for `None`.
    pub fn when<P>(self, predicate: P) -> Self
    where
        P: Fn(Option<&TaskError>) -> bool + Send + Sync + 'static,
    {
        RetryPolicy::When {
            inner: Arc::new(self),
            predicate: Arc::new(predicate),
        }
    }

    /// Extends the policy to retry only on failures of the given kind.
    ///
    /// A `None` cause (pre-first-attempt) does not match any kind.
    pub fn when_kind(self, kind: TaskErrorKind) -> Self {
        self.when(move |cause| cause.map_or(false, |err| err.kind() == kind))
    }

    /// Computes the delay before the next attempt.
    ///
    /// `attempts` is the number of completed attempts so far; `cause` is the
    /// most recent failure, absent before the first attempt. Returns `None`
    /// when no further attempt should be made.
    pub fn delay(&self, attempts: u32, cause: Option<&TaskError>) -> Option<Duration> {
        match self {
            RetryPolicy::None => (attempts == 0).then_some(Duration::ZERO),
            RetryPolicy::Continuously => Some(Duration::ZERO),
            RetryPolicy::Every { period } => Some(*period),
            RetryPolicy::Linear { period } => Some(period.saturating_mul(attempts)),
            RetryPolicy::Exponential { period } => {
                if attempts > MAX_EXPONENT {
                    None
                } else {
                    Some(shift_duration(*period, attempts))
                }
            }
            RetryPolicy::Limit { inner, max } => {
                if attempts <= *max {
                    inner.delay(attempts, cause)
                } else {
                    None
                }
            }
            RetryPolicy::When { inner, predicate } => {
                if predicate(cause) {
                    inner.delay(attempts, cause)
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryPolicy::None => f.write_str("None"),
            RetryPolicy::Continuously => f.write_str("Continuously"),
            RetryPolicy::Every { period } => {
                f.debug_struct("Every").field("period", period).finish()
            }
            RetryPolicy::Linear { period } => {
                f.debug_struct("Linear").field("period", period).finish()
            }
            RetryPolicy::Exponential { period } => f
                .debug_struct("Exponential")
                .field("period", period)
                .finish(),
            RetryPolicy::Limit { inner, max } => f
                .debug_struct("Limit")
                .field("max", max)
                .field("inner", inner)
                .finish(),
            RetryPolicy::When { inner, .. } => f
                .debug_struct("When")
                .field("inner", inner)
                .finish_non_exhaustive(),
        }
    }
}

/// Multiplies `period` by `2^exp`, clamping to `Duration::MAX` on overflow.
fn shift_duration(period: Duration, exp: u32) -> Duration {
    let factor = 1u128 << exp; // exp <= 62, cannot overflow the shift
    match period.as_nanos().checked_mul(factor) {
        Some(nanos) if nanos <= Duration::MAX.as_nanos() => {
            let secs = (nanos / 1_000_000_000) as u64;
            let sub = (nanos % 1_000_000_000) as u32;
            Duration::new(secs, sub)
        }
        _ => Duration::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail() -> TaskError {
        TaskError::Fail { error: "boom".into() }
    }

    #[test]
    fn none_permits_single_attempt() {
        // Canonical resolution of the historical ambiguity: the initial
        // attempt runs, nothing after it does.
        let policy = RetryPolicy::none();
        assert_eq!(policy.delay(0, None), Some(Duration::ZERO));
        assert_eq!(policy.delay(1, Some(&fail())), None);
        assert_eq!(policy.delay(7, Some(&fail())), None);
    }

    #[test]
    fn continuously_never_stops() {
        let policy = RetryPolicy::continuously();
        for attempts in [0, 1, 10, 1_000_000] {
            assert_eq!(policy.delay(attempts, None), Some(Duration::ZERO));
        }
    }

    #[test]
    fn every_returns_fixed_period() {
        let policy = RetryPolicy::every(Duration::from_millis(250));
        assert_eq!(policy.delay(0, None), Some(Duration::from_millis(250)));
        assert_eq!(
            policy.delay(42, Some(&fail())),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn linear_grows_by_one_period_per_attempt() {
        let policy = RetryPolicy::with_linear_backoff(Duration::from_millis(10));
        assert_eq!(policy.delay(0, None), Some(Duration::ZERO));
        assert_eq!(policy.delay(1, Some(&fail())), Some(Duration::from_millis(10)));
        assert_eq!(policy.delay(5, Some(&fail())), Some(Duration::from_millis(50)));
    }

    #[test]
    fn exponential_doubles_each_attempt() {
        let policy = RetryPolicy::with_exponential_backoff(Duration::from_millis(1));
        for a in 0..=10u32 {
            assert_eq!(
                policy.delay(a, Some(&fail())),
                Some(Duration::from_millis(1 << a)),
                "attempt {a}"
            );
        }
    }

    #[test]
    fn exponential_stops_past_shift_width() {
        let policy = RetryPolicy::with_exponential_backoff(Duration::from_millis(1));
        assert!(policy.delay(62, Some(&fail())).is_some());
        assert_eq!(policy.delay(63, Some(&fail())), None);
        assert_eq!(policy.delay(u32::MAX, Some(&fail())), None);
    }

    #[test]
    fn exponential_clamps_on_overflow() {
        let policy = RetryPolicy::with_exponential_backoff(Duration::from_secs(1u64 << 40));
        assert_eq!(policy.delay(60, Some(&fail())), Some(Duration::MAX));
    }

    #[test]
    fn limit_cuts_off_past_threshold() {
        let policy = RetryPolicy::continuously().limit(3);
        assert_eq!(policy.delay(0, None), Some(Duration::ZERO));
        assert_eq!(policy.delay(3, Some(&fail())), Some(Duration::ZERO));
        assert_eq!(policy.delay(4, Some(&fail())), None);
    }

    #[test]
    fn limit_does_not_mutate_wrapped_policy() {
        let base = RetryPolicy::every(Duration::from_millis(5));
        let limited = base.clone().limit(1);
        assert_eq!(limited.delay(2, Some(&fail())), None);
        // The original policy still answers past the decorator's threshold.
        assert_eq!(base.delay(2, Some(&fail())), Some(Duration::from_millis(5)));
    }

    #[test]
    fn when_rejects_unmatched_failures() {
        let policy = RetryPolicy::continuously()
            .when(|cause| cause.map_or(true, TaskError::is_retryable));
        assert_eq!(policy.delay(1, Some(&fail())), Some(Duration::ZERO));
        assert_eq!(
            policy.delay(1, Some(&TaskError::Fatal { error: "nope".into() })),
            None
        );
    }

    #[test]
    fn when_receives_absent_cause_before_first_attempt() {
        let policy = RetryPolicy::continuously().when(|cause| cause.is_some());
        // Pre-first-attempt consultation; the executor clamps this to zero.
        assert_eq!(policy.delay(0, None), None);
        assert_eq!(policy.delay(1, Some(&fail())), Some(Duration::ZERO));
    }

    #[test]
    fn when_kind_matches_only_that_kind() {
        let policy = RetryPolicy::continuously().when_kind(TaskErrorKind::Timeout);
        let timeout = TaskError::Timeout {
            timeout: Duration::from_secs(1),
        };
        assert_eq!(policy.delay(1, Some(&timeout)), Some(Duration::ZERO));
        assert_eq!(policy.delay(1, Some(&fail())), None);
        assert_eq!(policy.delay(0, None), None);
    }

    #[test]
    fn decorators_stack() {
        let policy = RetryPolicy::every(Duration::from_millis(1))
            .limit(5)
            .when_kind(TaskErrorKind::Fail);
        assert_eq!(policy.delay(3, Some(&fail())), Some(Duration::from_millis(1)));
        assert_eq!(policy.delay(6, Some(&fail())), None);
        assert_eq!(policy.delay(3, Some(&TaskError::Canceled)), None);
    }
}
