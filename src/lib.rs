//! # persevere
//!
//! **Persevere** is a lightweight retry-execution library for Rust.
//!
//! It drives a fallible async task through repeated attempts according to a
//! composable delay policy, and hands the caller a cancellable, awaitable
//! handle to the eventual outcome. The crate is designed as a building block
//! for higher-level schedulers and orchestrators.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       ┌───────────────┐      ┌────────────────────────────────┐
//!       │  RetryPolicy  │      │  Task (user unit of work)      │
//!       │ none/every/…  │      │  async run(ctx) -> Result<V>   │
//!       │ .limit .when  │      └───────────────┬────────────────┘
//!       └───────┬───────┘                      │
//!               │ execute / execute_with       │
//!               ▼                              ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  core::executor (attempt loop)                                │
//! │  - consults policy.delay(attempts, cause) after each failure  │
//! │  - chains suppressed failures (nothing is ever dropped)       │
//! │  - publishes lifecycle events to the execution's Bus          │
//! └───────┬───────────────────────────────────────────┬───────────┘
//!         │ schedule_after(delay, next attempt)       │ finalize
//!         ▼                                           ▼
//! ┌──────────────────────────┐            ┌──────────────────────────┐
//! │  Scheduler (capability)  │            │  RetryFuture<V>          │
//! │  InlineScheduler (sync)  │            │  await / wait / cancel   │
//! │  TokioScheduler (spawn)  │            │  policy / current_delay  │
//! └──────────────────────────┘            │  events                  │
//!                                         └──────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! policy.execute(task)
//!   ├─► initial = policy.delay(0, None)   (clamped to zero)
//!   └─► schedule attempt #1 after initial
//!
//! attempt #n:
//!   ├─► future cancelled? → no-op
//!   ├─► task.run(ctx)
//!   │     ├─ Ok(v)  → RetryFuture resolves Ok(v)
//!   │     └─ Err(e) → policy.delay(n, Some(&e))
//!   │            ├─ Some(d) → remember e, schedule attempt #n+1 after d
//!   │            └─ None    → RetryFuture resolves
//!   │                         Err(Exhausted { cause: e, suppressed })
//!   └─► cancel(interrupt) at any time → terminal Canceled state
//! ```
//!
//! ## Features
//! | Area           | Description                                                     | Key types / traits                      |
//! |----------------|-----------------------------------------------------------------|-----------------------------------------|
//! | **Policies**   | Compose delay policies by decoration.                           | [`RetryPolicy`]                         |
//! | **Execution**  | Drive one task through sequential attempts.                     | [`RetryPolicy::execute`]                |
//! | **Handles**    | Await, block, cancel, inspect pending executions.               | [`RetryFuture`]                         |
//! | **Scheduling** | Plug in where and when attempts run.                            | [`Scheduler`], [`InlineScheduler`], [`TokioScheduler`] |
//! | **Errors**     | Typed task failures and full retry history.                     | [`TaskError`], [`RetryError`]           |
//! | **Events**     | Observe the attempt lifecycle per execution.                    | [`Event`], [`RetryFuture::events`]      |
//! | **Tasks**      | Define tasks as trait impls or closures.                        | [`Task`], [`TaskFn`], [`TaskRef`]       |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use persevere::{RetryPolicy, TaskError, TaskFn, TokioScheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let task = TaskFn::arc("fetch-config", |ctx: CancellationToken| async move {
//!         if ctx.is_cancelled() {
//!             return Err(TaskError::Canceled);
//!         }
//!         // do work...
//!         Ok("config payload".to_string())
//!     });
//!
//!     let policy = RetryPolicy::with_exponential_backoff(Duration::from_millis(10)).limit(5);
//!     let future = policy.execute_with(task, Arc::new(TokioScheduler));
//!
//!     let value = future.await?;
//!     assert_eq!(value, "config payload");
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod policies;
mod schedulers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::RetryFuture;
pub use error::{RetryError, TaskError, TaskErrorKind};
pub use events::{Bus, Event, EventKind};
pub use policies::{FailurePredicate, RetryPolicy};
pub use schedulers::{InlineScheduler, ScheduleHandle, ScheduledWork, Scheduler, TokioScheduler};
pub use tasks::{Task, TaskFn, TaskRef};
