//! # RetryFuture: the cancellable completion handle.
//!
//! [`RetryFuture`] is what callers hold while the executor drives their task:
//! an awaitable result container that also exposes the policy in effect, an
//! advisory "delay until next attempt" value, cancellation, and a lifecycle
//! event stream.
//!
//! ## Terminal-state invariant
//! The future transitions exactly once from pending to one of three terminal
//! states: completed with a value, failed with [`RetryError::Exhausted`], or
//! cancelled. The transition is guarded by taking the one-shot sender out of
//! the shared completion cell under its mutex; whichever path takes it first
//! (attempt callback or [`RetryFuture::cancel`]) wins, every later path is a
//! no-op.
//!
//! ## Ownership
//! The attempt counter and the suppressed-failure list are *not* in here:
//! they travel through the executor's recursive attempt closure, owned by
//! whichever attempt is currently running. The shared cell only holds what
//! cancellation genuinely needs to reach across threads: the pending
//! schedule handle and the completion sender.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::RetryError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::RetryPolicy;
use crate::schedulers::ScheduleHandle;

/// State shared between the executor's attempt callbacks and the handle.
pub(crate) struct Shared<V> {
    policy: RetryPolicy,
    bus: Bus,
    name: Arc<str>,
    /// Cancelled via [`RetryFuture::cancel`] in interrupt mode; handed to the
    /// task on every attempt.
    interrupt: CancellationToken,
    cancelled: AtomicBool,
    /// Advisory delay metadata in milliseconds, see
    /// [`RetryFuture::current_delay`].
    delay_ms: AtomicU64,
    cell: Mutex<Cell<V>>,
}

/// The completion cell: the single-assignment gate for the terminal state.
struct Cell<V> {
    tx: Option<oneshot::Sender<Result<V, RetryError>>>,
    pending: Option<ScheduleHandle>,
}

impl<V> Shared<V> {
    pub(crate) fn new(
        policy: RetryPolicy,
        bus: Bus,
        name: &str,
        tx: oneshot::Sender<Result<V, RetryError>>,
    ) -> Self {
        Self {
            policy,
            bus,
            name: Arc::from(name),
            interrupt: CancellationToken::new(),
            cancelled: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            cell: Mutex::new(Cell {
                tx: Some(tx),
                pending: None,
            }),
        }
    }

    fn lock_cell(&self) -> MutexGuard<'_, Cell<V>> {
        // A panic inside an attempt callback must not wedge the cell.
        self.cell.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    pub(crate) fn name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub(crate) fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn set_delay(&self, delay: Duration) {
        let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms.store(ms, Ordering::SeqCst);
    }

    pub(crate) fn current_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::SeqCst))
    }

    /// Records the handle of the attempt that was just scheduled, replacing
    /// the previous one.
    pub(crate) fn set_pending(&self, handle: ScheduleHandle) {
        self.lock_cell().pending = Some(handle);
    }

    /// Finalizes the execution. No-op if a terminal state was already
    /// reached.
    pub(crate) fn complete(&self, outcome: Result<V, RetryError>) {
        let tx = self.lock_cell().tx.take();
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.lock_cell().tx.is_none()
    }

    /// Cancels the execution; returns `false` if it was already terminal.
    fn cancel(&self, interrupt: bool) -> bool {
        let (tx, pending) = {
            let mut cell = self.lock_cell();
            let Some(tx) = cell.tx.take() else {
                return false;
            };
            (tx, cell.pending.take())
        };
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = pending {
            handle.cancel();
        }
        if interrupt {
            self.interrupt.cancel();
        }
        self.bus
            .publish(Event::new(EventKind::ExecutionCanceled).with_task(self.name()));
        let _ = tx.send(Err(RetryError::Canceled));
        true
    }
}

/// Cancellable, awaitable handle to one retry execution.
///
/// Awaiting the future yields `Result<V, RetryError>`. Because it is a plain
/// [`Future`], downstream composition comes from the usual combinators:
///
/// ```rust
/// use futures::FutureExt;
/// use tokio_util::sync::CancellationToken;
/// use persevere::{RetryPolicy, TaskError, TaskFn};
///
/// let task = TaskFn::arc("answer", |_ctx: CancellationToken| async {
///     Ok::<_, TaskError>(21u32)
/// });
/// let doubled = RetryPolicy::none()
///     .execute(task)
///     .map(|res| res.map(|v| v * 2));
/// assert_eq!(futures::executor::block_on(doubled).unwrap(), 42);
/// ```
pub struct RetryFuture<V> {
    shared: Arc<Shared<V>>,
    rx: oneshot::Receiver<Result<V, RetryError>>,
}

impl<V> RetryFuture<V> {
    pub(crate) fn new(
        shared: Arc<Shared<V>>,
        rx: oneshot::Receiver<Result<V, RetryError>>,
    ) -> Self {
        Self { shared, rx }
    }

    /// The delay policy this execution runs under: the exact value that was
    /// passed to [`execute`](crate::RetryPolicy::execute), unchanged.
    pub fn policy(&self) -> &RetryPolicy {
        self.shared.policy()
    }

    /// Advisory delay before the next attempt fires.
    ///
    /// Updated just before each scheduling step; useful for ordering pending
    /// retries in an external scheduling queue. Millisecond granularity, and
    /// meaningless once the future is terminal.
    pub fn current_delay(&self) -> Duration {
        self.shared.current_delay()
    }

    /// Returns `true` once [`cancel`](RetryFuture::cancel) has marked this
    /// execution cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Returns `true` once the execution reached any terminal state.
    pub fn is_terminal(&self) -> bool {
        self.shared.is_terminal()
    }

    /// Cancels the execution.
    ///
    /// Prevents any not-yet-started attempt from running; with
    /// `interrupt == true` additionally cancels the [`CancellationToken`]
    /// the task received, asking an in-flight attempt to stop cooperatively.
    /// Returns `false` if the execution was already terminal (the outcome is
    /// left unchanged).
    pub fn cancel(&self, interrupt: bool) -> bool {
        self.shared.cancel(interrupt)
    }

    /// Subscribes to this execution's lifecycle events.
    ///
    /// Fire-and-forget semantics: only events published after this call are
    /// observed, and slow receivers may lag. See [`crate::events`].
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus().subscribe()
    }

    /// Blocks the current thread until the execution finishes.
    ///
    /// Must not be called from async context; use `.await` there instead.
    pub fn wait(self) -> Result<V, RetryError> {
        futures::executor::block_on(self)
    }
}

impl<V> Future for RetryFuture<V> {
    type Output = Result<V, RetryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|res| match res {
            Ok(outcome) => outcome,
            // The executor side never drops the sender without completing,
            // but a torn-down runtime can; report it as cancellation.
            Err(_) => Err(RetryError::Canceled),
        })
    }
}

impl<V> std::fmt::Debug for RetryFuture<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryFuture")
            .field("policy", self.policy())
            .field("cancelled", &self.is_cancelled())
            .field("terminal", &self.is_terminal())
            .field("current_delay", &self.current_delay())
            .finish()
    }
}
