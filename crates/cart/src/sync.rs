//! Cross-session reconciliation.
//!
//! One coordinator per [`CartStore`]. Reconciliation runs on three triggers:
//!
//! 1. **Startup** - once, before the ready signal fires.
//! 2. **Storage notice** - whenever another session's handle writes to the
//!    shared store (backends without notices fall through to the poll).
//! 3. **Poll** - a fixed-interval fallback covering missed notices.
//!
//! Convergence is last-writer-wins over full snapshots; a session that has
//! been idle may observe a stale cart for up to the poll interval.
//!
//! The background task aborts when the coordinator is dropped.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::persist::StorageNotice;
use crate::store::CartStore;

/// Drives reconciliation for one store. Dropping it stops the loop.
#[derive(Debug)]
pub struct SyncCoordinator {
    task: JoinHandle<()>,
    ready: watch::Receiver<bool>,
}

impl SyncCoordinator {
    /// Reconcile once, emit the ready signal, then keep the store converged
    /// via storage notices and the `poll_interval` fallback.
    #[must_use]
    pub fn spawn(store: CartStore, poll_interval: Duration) -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        let notices = store.storage_notices();
        let task = tokio::spawn(run(store, notices, poll_interval, ready_tx));
        Self {
            task,
            ready: ready_rx,
        }
    }

    /// One-shot readiness signal: flips to `true` after the startup
    /// reconciliation, i.e. once the first load from the persistent store
    /// has completed and the cart is safe to render.
    #[must_use]
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready.clone()
    }
}

impl Drop for SyncCoordinator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[instrument(skip_all)]
async fn run(
    store: CartStore,
    notices: Option<broadcast::Receiver<StorageNotice>>,
    poll_interval: Duration,
    ready_tx: watch::Sender<bool>,
) {
    store.reconcile();
    let _ = ready_tx.send(true);
    debug!("startup reconciliation complete");

    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // interval fires immediately; the startup reconcile already covered that
    ticker.tick().await;

    match notices {
        Some(mut notices) => loop {
            tokio::select! {
                _ = ticker.tick() => {
                    store.reconcile();
                }
                notice = notices.recv() => match notice {
                    Ok(notice) => {
                        debug!(key = %notice.key, "storage notice, reconciling");
                        store.reconcile();
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // dropped notices are fine, one reconcile catches up
                        debug!(missed, "storage notices lagged, reconciling");
                        store.reconcile();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!("storage notice channel closed, falling back to poll only");
                        poll_only(&store, &mut ticker).await;
                        return;
                    }
                },
            }
        },
        None => poll_only(&store, &mut ticker).await,
    }
}

async fn poll_only(store: &CartStore, ticker: &mut tokio::time::Interval) {
    loop {
        ticker.tick().await;
        store.reconcile();
    }
}
