//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] — trait for implementing async, cancellable units of work with
//!   a typed output
//! - [`TaskFn`] — function-based task implementation
//! - [`TaskRef`] — shared reference to a task (`Arc<dyn Task<Output = V>>`)

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
