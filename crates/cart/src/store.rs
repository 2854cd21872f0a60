//! The authoritative in-memory cart.
//!
//! One `CartStore` per session ("tab"). Mutations run to completion under a
//! short lock - the concurrency that matters is *across* sessions, mediated
//! entirely through the shared persistent store and resolved by
//! [`SyncCoordinator`](crate::sync::SyncCoordinator) reconciliation.
//!
//! Every mutation schedules a debounced persistence write, refreshes the
//! debounced totals channel, and publishes a typed event. Persistence is
//! best-effort: the in-memory state here stays authoritative for this
//! session even when storage refuses writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use driftwood_core::{
    ActivePromo, AppliedPromo, CartItem, CartTotals, DiscountState, ItemId, ProductRef,
};
use rust_decimal::Decimal;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::catalog::PromoCatalog;
use crate::config::CartConfig;
use crate::debounce::Debouncer;
use crate::error::PromoError;
use crate::events::{CartChange, CartEvent, EventBus};
use crate::persist::{CartSnapshot, PersistentStore, StorageBackend, StorageNotice};
use crate::pricing;

struct CartState {
    items: Vec<CartItem>,
    discount: DiscountState,
}

impl CartState {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            discount: self.discount.clone(),
        }
    }

    fn totals(&self) -> CartTotals {
        pricing::totals(&self.items, &self.discount)
    }
}

/// Handle to one session's cart. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Mutex<CartState>>,
    catalog: Arc<PromoCatalog>,
    persist: PersistentStore,
    events: EventBus,
    persist_debounce: Debouncer<CartSnapshot>,
    totals_debounce: Debouncer<CartTotals>,
    totals_tx: Arc<watch::Sender<CartTotals>>,
}

impl CartStore {
    /// Construct a store over `backend`, rehydrating any persisted cart.
    ///
    /// Must be called inside a tokio runtime (debounced work is spawned).
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, config: &CartConfig) -> Self {
        Self::with_catalog(backend, config, PromoCatalog::default())
    }

    /// Construct a store with an explicit promo catalog.
    #[must_use]
    pub fn with_catalog(
        backend: Arc<dyn StorageBackend>,
        config: &CartConfig,
        catalog: PromoCatalog,
    ) -> Self {
        let persist = PersistentStore::new(backend);
        let rehydrated = persist.load();
        debug!(items = rehydrated.items.len(), "cart rehydrated");

        let state = CartState {
            items: rehydrated.items,
            discount: rehydrated.discount,
        };
        let (totals_tx, _) = watch::channel(state.totals());
        let totals_tx = Arc::new(totals_tx);

        let persist_debounce = Debouncer::new(config.persist_debounce, {
            let persist = persist.clone();
            move |snapshot: CartSnapshot| persist.save(&snapshot)
        });
        let totals_debounce = Debouncer::new(config.totals_debounce, {
            let totals_tx = Arc::clone(&totals_tx);
            move |totals: CartTotals| {
                let _ = totals_tx.send(totals);
            }
        });

        Self {
            inner: Arc::new(Mutex::new(state)),
            catalog: Arc::new(catalog),
            persist,
            events: EventBus::new(config.event_capacity),
            persist_debounce,
            totals_debounce,
            totals_tx,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`: increments the existing line's quantity if
    /// the derived id is already in the cart, otherwise appends a new line.
    /// Always succeeds. Returns the resulting line.
    pub fn add_item(&self, product: &ProductRef) -> CartItem {
        let mut state = self.lock();
        let id = ItemId::derive(&product.name);

        let item = if let Some(existing) = state.items.iter_mut().find(|item| item.id == id) {
            existing.quantity = existing.quantity.saturating_add(1);
            existing.clone()
        } else {
            let item = CartItem::new(product);
            state.items.push(item.clone());
            item
        };

        debug!(id = %item.id, quantity = item.quantity, "item added");
        self.after_mutation(&state, CartChange::Added { item: item.clone() });
        item
    }

    /// Remove the line with `id`. A missing id is a no-op, not an error.
    /// Returns whether anything was removed.
    pub fn remove_item(&self, id: &ItemId) -> bool {
        let mut state = self.lock();
        let before = state.items.len();
        state.items.retain(|item| item.id != *id);
        if state.items.len() == before {
            return false;
        }

        debug!(%id, "item removed");
        self.after_mutation(&state, CartChange::Removed { id: id.clone() });
        true
    }

    /// Set the quantity of the line with `id` exactly (not incrementally).
    /// A quantity of zero behaves exactly like [`CartStore::remove_item`].
    /// Returns whether the cart changed.
    pub fn set_quantity(&self, id: &ItemId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_item(id);
        }

        let mut state = self.lock();
        let Some(item) = state.items.iter_mut().find(|item| item.id == *id) else {
            return false;
        };
        item.quantity = quantity;

        debug!(%id, quantity, "quantity set");
        self.after_mutation(
            &state,
            CartChange::Updated {
                id: id.clone(),
                quantity,
            },
        );
        true
    }

    /// Empty the item list. Promo state is independent and is kept until
    /// [`CartStore::remove_promo`].
    pub fn clear(&self) {
        let mut state = self.lock();
        state.items.clear();
        info!("cart cleared");
        self.after_mutation(&state, CartChange::Cleared);
    }

    /// Apply a promo code from the catalog (case-insensitive).
    ///
    /// The discount is resolved against the *current* subtotal and frozen:
    /// later cart changes do not recompute it. Applying a different code
    /// replaces the active one; only one promo is active at a time.
    ///
    /// # Errors
    ///
    /// - [`PromoError::UnknownCode`] when the code is not in the catalog
    /// - [`PromoError::AlreadyApplied`] when the same code is already active
    pub fn apply_promo(&self, code: &str) -> Result<AppliedPromo, PromoError> {
        let promo = self
            .catalog
            .lookup(code)
            .ok_or_else(|| PromoError::UnknownCode(code.trim().to_owned()))?
            .clone();

        let mut state = self.lock();
        if state.discount.is_active(&promo.code) {
            return Err(PromoError::AlreadyApplied(promo.code));
        }

        let subtotal = pricing::subtotal(&state.items);
        let amount = pricing::discount_for(subtotal, &promo);
        state.discount.active = Some(ActivePromo {
            code: promo.code.clone(),
            amount,
        });

        info!(code = %promo.code, %amount, "promo applied");
        self.schedule_persist(&state);
        self.push_totals(&state);
        self.events.publish(CartEvent::PromoApplied {
            code: promo.code.clone(),
            discount: amount,
            description: promo.description.clone(),
        });

        Ok(AppliedPromo {
            code: promo.code,
            discount: amount,
            description: promo.description,
        })
    }

    /// Clear the discount state. A no-op (not an error) when no promo is
    /// active. Returns whether a promo was removed.
    pub fn remove_promo(&self) -> bool {
        let mut state = self.lock();
        if state.discount.active.take().is_none() {
            return false;
        }

        info!("promo removed");
        self.schedule_persist(&state);
        self.push_totals(&state);
        self.events.publish(CartEvent::PromoRemoved);
        true
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// `sum(unit_price * quantity)` over all items.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(&self.lock().items)
    }

    /// The active discount amount, clamped to the subtotal.
    #[must_use]
    pub fn discount_amount(&self) -> Decimal {
        self.lock().totals().discount
    }

    /// `max(0, subtotal - discount)`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().totals().total
    }

    /// Sum of quantities across all items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lock().items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the item list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    /// Snapshot of the item list, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().items.clone()
    }

    /// The active promo, if any.
    #[must_use]
    pub fn active_promo(&self) -> Option<ActivePromo> {
        self.lock().discount.active.clone()
    }

    /// Current totals snapshot (computed now, not the debounced channel).
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.lock().totals()
    }

    // =========================================================================
    // Events, persistence, reconciliation
    // =========================================================================

    /// Subscribe to the engine's notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// The debounced totals channel (badge refresh). Coalesces bursts of
    /// mutations into one update per quiet period.
    #[must_use]
    pub fn totals_watch(&self) -> watch::Receiver<CartTotals> {
        self.totals_tx.subscribe()
    }

    /// Persist immediately, bypassing the debounce. Used by checkout and
    /// teardown paths that must not lose a pending write.
    pub fn flush(&self) {
        self.persist_debounce.cancel();
        let snapshot = self.lock().snapshot();
        self.persist.save(&snapshot);
    }

    /// Replace in-memory state with the persisted snapshot if they differ.
    ///
    /// Last-writer-wins at full-snapshot granularity; there is no per-item
    /// merge. Publishes [`CartChange::Reloaded`] when state was replaced.
    /// Returns whether anything changed.
    pub fn reconcile(&self) -> bool {
        let loaded = self.persist.load();
        let mut state = self.lock();
        if state.items == loaded.items && state.discount == loaded.discount {
            return false;
        }

        info!(
            items = loaded.items.len(),
            "cart replaced from persistent store"
        );
        state.items = loaded.items;
        state.discount = loaded.discount;

        // no persist here: reconciliation must never echo writes back into
        // the shared store
        self.push_totals(&state);
        self.events.publish(CartEvent::Changed(CartChange::Reloaded));
        true
    }

    /// Storage change notices from other sessions, if the backend has them.
    #[must_use]
    pub fn storage_notices(&self) -> Option<broadcast::Receiver<StorageNotice>> {
        self.persist.subscribe()
    }

    fn after_mutation(&self, state: &CartState, change: CartChange) {
        self.schedule_persist(state);
        self.push_totals(state);
        self.events.publish(CartEvent::Changed(change));
    }

    fn schedule_persist(&self, state: &CartState) {
        self.persist_debounce.call(state.snapshot());
    }

    fn push_totals(&self, state: &CartState) {
        self.totals_debounce.call(state.totals());
    }

    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CartStore")
            .field("items", &state.items.len())
            .field("discount", &state.discount)
            .finish_non_exhaustive()
    }
}
