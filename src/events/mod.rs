//! # Lifecycle events for retry executions.
//!
//! Each retry execution owns a small broadcast [`Bus`] and publishes
//! [`Event`]s as attempts start, fail, and get rescheduled. Subscribe through
//! [`RetryFuture::events`](crate::RetryFuture::events) for logging or
//! diagnostics; events are fire-and-forget and are dropped when nobody
//! listens.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
