//! Shared in-memory backend.
//!
//! Models the origin-scoped store that all sessions ("tabs") of one browser
//! profile share: one [`MemoryStore`] per profile, one handle per session.
//! A handle's writes are announced to every *other* handle, matching browser
//! storage-event semantics, which is what the convergence tests rely on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::error::StorageError;
use crate::persist::{StorageBackend, StorageNotice};

const NOTICE_CAPACITY: usize = 32;

struct Shared {
    entries: Mutex<HashMap<String, String>>,
    // per-handle notice channels so a writer can skip its own handle
    channels: Mutex<Vec<(u64, broadcast::Sender<StorageNotice>)>>,
    next_handle_id: AtomicU64,
}

/// The shared store. Create one, then hand each session a
/// [`MemoryStore::handle`].
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    /// Create an empty shared store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(HashMap::new()),
                channels: Mutex::new(Vec::new()),
                next_handle_id: AtomicU64::new(0),
            }),
        }
    }

    /// Number of live handles (used by tests and diagnostics).
    #[must_use]
    pub fn handle_count(&self) -> usize {
        lock(&self.shared.channels).len()
    }

    /// Create a session handle. Each handle has its own identity for notice
    /// filtering.
    #[must_use]
    pub fn handle(&self) -> MemoryBackend {
        let id = self.shared.next_handle_id.fetch_add(1, Ordering::Relaxed);
        let (tx, _) = broadcast::channel(NOTICE_CAPACITY);
        lock(&self.shared.channels).push((id, tx.clone()));
        MemoryBackend {
            id,
            shared: Arc::clone(&self.shared),
            notices: tx,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &lock(&self.shared.entries).len())
            .finish_non_exhaustive()
    }
}

/// One session's handle onto a [`MemoryStore`].
pub struct MemoryBackend {
    id: u64,
    shared: Arc<Shared>,
    notices: broadcast::Sender<StorageNotice>,
}

impl MemoryBackend {
    fn announce(&self, key: &str) {
        let notice = StorageNotice {
            key: key.to_owned(),
        };
        for (id, tx) in lock(&self.shared.channels).iter() {
            if *id != self.id {
                // send fails only when that handle has no live subscriber
                let _ = tx.send(notice.clone());
            }
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.shared.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.shared.entries).insert(key.to_owned(), value.to_owned());
        self.announce(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if lock(&self.shared.entries).remove(key).is_some() {
            self.announce(key);
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageNotice>> {
        Some(self.notices.subscribe())
    }
}

impl Drop for MemoryBackend {
    // unregister the notice channel so session churn doesn't accumulate
    // dead senders in the shared store
    fn drop(&mut self) {
        lock(&self.shared.channels).retain(|(id, _)| *id != self.id);
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
