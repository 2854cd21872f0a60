//! Trailing-edge debouncer.
//!
//! Coalesces bursts of calls into a single deferred execution: each `call`
//! cancels any pending execution and schedules the action to run with the
//! latest value once `wait` has elapsed with no further calls. Built as a
//! cancellable deferred task so the coalescing behavior is testable with
//! paused tokio time instead of wall-clock sleeps.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// A trailing-edge debounced action over values of type `T`.
///
/// Requires a tokio runtime; `call` panics outside of one (the engine is
/// constructed inside the host application's runtime).
pub struct Debouncer<T> {
    wait: Duration,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Wrap `action` with a `wait` quiet period.
    pub fn new(wait: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            wait,
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedule the action with `value`, replacing any pending execution.
    ///
    /// The action runs `wait` after the most recent `call`, with the most
    /// recent value. Earlier pending values are dropped, never executed.
    pub fn call(&self, value: T) {
        let mut pending = self.lock_pending();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let action = Arc::clone(&self.action);
        let wait = self.wait;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            action(value);
        }));
    }

    /// Cancel any pending execution without running it.
    pub fn cancel(&self) {
        if let Some(handle) = self.lock_pending().take() {
            handle.abort();
        }
    }

    /// Whether an execution is currently scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            wait: self.wait,
            action: Arc::clone(&self.action),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}
