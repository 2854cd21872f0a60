//! Engine configuration.
//!
//! Constructed once at application start and passed to
//! [`CartStore::new`](crate::store::CartStore::new) - the engine holds no
//! ambient global state.

use std::time::Duration;

/// Timing and capacity knobs for one cart engine instance.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Quiet period before a burst of mutations is persisted.
    pub persist_debounce: Duration,
    /// Quiet period before the totals (badge) channel is refreshed.
    pub totals_debounce: Duration,
    /// Fallback reconciliation interval, covering missed storage notices.
    pub poll_interval: Duration,
    /// Capacity of the event broadcast channel; lagged subscribers lose the
    /// oldest events.
    pub event_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            persist_debounce: Duration::from_millis(300),
            totals_debounce: Duration::from_millis(100),
            poll_interval: Duration::from_secs(5),
            event_capacity: 64,
        }
    }
}
