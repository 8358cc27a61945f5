//! Retry engine core: the attempt loop and the completion handle.
//!
//! The only public API from this module is [`RetryFuture`]; the entry points
//! live on [`RetryPolicy`](crate::RetryPolicy)
//! ([`execute`](crate::RetryPolicy::execute) /
//! [`execute_with`](crate::RetryPolicy::execute_with)) and are implemented in
//! [`executor`].
//!
//! Internal modules:
//! - [`executor`]: schedules attempts, consults the policy after each
//!   failure, chains suppressed failures;
//! - [`future`]: the shared completion cell and the [`RetryFuture`] handle.

mod executor;
mod future;

pub use future::RetryFuture;
