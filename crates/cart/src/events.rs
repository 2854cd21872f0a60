//! Typed notification surface.
//!
//! The event surface is deliberately narrow and cart-specific: a fixed set
//! of variants rather than string-keyed events, so collaborators cannot
//! subscribe to or emit arbitrary names.

use driftwood_core::{CartItem, ItemId};
use rust_decimal::Decimal;
use tokio::sync::broadcast;

/// What changed in the item list.
#[derive(Debug, Clone, PartialEq)]
pub enum CartChange {
    /// An item was added, or an existing line's quantity was incremented by
    /// an add. Carries the resulting line.
    Added {
        /// The line after the add.
        item: CartItem,
    },
    /// An item was removed.
    Removed {
        /// Identity of the removed line.
        id: ItemId,
    },
    /// A line's quantity was set explicitly.
    Updated {
        /// Identity of the updated line.
        id: ItemId,
        /// The new quantity (>= 1; zero-quantity requests surface as
        /// [`CartChange::Removed`]).
        quantity: u32,
    },
    /// The cart was emptied.
    Cleared,
    /// In-memory state was replaced from the persistent store during
    /// reconciliation (startup, storage notice, or poll).
    Reloaded,
}

/// Notifications published by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    /// The item list changed.
    Changed(CartChange),
    /// A promo code was applied.
    PromoApplied {
        /// Canonical code.
        code: String,
        /// Resolved discount amount (currency units).
        discount: Decimal,
        /// Catalog description for display.
        description: String,
    },
    /// The active promo was removed.
    PromoRemoved,
}

/// Broadcast bus for [`CartEvent`]s.
///
/// Publishing with no subscribers is not an error. Subscribers that fall
/// behind by more than the channel capacity lose the oldest events
/// (`RecvError::Lagged`); UI consumers should treat a lag as "re-read the
/// store" rather than replaying events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CartEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: CartEvent) {
        tracing::trace!(?event, "publishing cart event");
        // send only fails when there are no subscribers, which is fine
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers (used by tests and diagnostics).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
