//! Delay policies for retrying tasks.
//!
//! This module groups the knobs that control **whether** a failed task is
//! retried and **how long** to wait between attempts.
//!
//! ## Contents
//! - [`RetryPolicy`] — composable delay policy (none / continuous / fixed /
//!   linear / exponential, plus `limit` and `when` decorators)
//! - [`FailurePredicate`] — shared predicate type used by [`RetryPolicy::when`]
//!
//! ## Quick wiring
//! ```text
//! RetryPolicy::continuously().limit(5).when_kind(TaskErrorKind::Fail)
//!      └─► core::executor uses:
//!           - policy.delay(0, None) for the initial scheduling delay
//!           - policy.delay(attempts, Some(&err)) after each failure
//!             (None = stop, finalize the future)
//! ```

mod retry;

pub use retry::{FailurePredicate, RetryPolicy};
