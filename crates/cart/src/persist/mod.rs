//! Persistence boundary.
//!
//! [`PersistentStore`] owns the serialized layout of the cart inside an
//! origin-scoped key-value store and nothing else - no business logic. It
//! never surfaces storage failures to its callers: reads fall back to the
//! empty state, writes are logged and dropped. The in-memory cart stays
//! authoritative for the current session regardless of what storage does.
//!
//! # Persisted layout
//!
//! - `cart` - JSON array of [`CartItem`]s (the one canonical cart key)
//! - `promo_code` - active code string, absent when no promo is active
//! - `promo_discount` - resolved discount amount as a decimal string
//!
//! The resolved discount is persisted alongside the code so reloads don't
//! re-derive it; the discount is a snapshot from application time.

mod json_file;
mod memory;

use std::sync::Arc;

use driftwood_core::{ActivePromo, CartItem, DiscountState};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, error, instrument, warn};

pub use json_file::JsonFileBackend;
pub use memory::{MemoryBackend, MemoryStore};

use crate::error::StorageError;

/// Key holding the serialized item list.
pub const CART_KEY: &str = "cart";
/// Key holding the active promo code.
pub const PROMO_CODE_KEY: &str = "promo_code";
/// Key holding the resolved discount amount as a decimal string.
pub const PROMO_DISCOUNT_KEY: &str = "promo_discount";

/// Notice that another session's handle wrote to the shared store.
///
/// Mirrors browser storage-event semantics: a handle never receives notices
/// for its own writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageNotice {
    /// The key that changed.
    pub key: String,
}

/// An origin-scoped, durable key-value store shared by all sessions of one
/// browser profile.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the write is refused (quota,
    /// availability).
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to change notices caused by *other* handles of the same
    /// underlying store. Backends without a notice mechanism return `None`;
    /// the reconciliation poll covers them.
    fn subscribe(&self) -> Option<broadcast::Receiver<StorageNotice>> {
        None
    }
}

/// Everything the engine persists: the item list and the discount state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartSnapshot {
    /// Ordered item list.
    pub items: Vec<CartItem>,
    /// Active promo, if any.
    pub discount: DiscountState,
}

/// Serialization layer over a [`StorageBackend`].
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
}

impl PersistentStore {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Load the persisted snapshot.
    ///
    /// Never fails toward the caller: missing keys yield the empty state and
    /// malformed content is logged and treated as empty.
    #[instrument(skip(self))]
    #[must_use]
    pub fn load(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.load_items(),
            discount: self.load_discount(),
        }
    }

    /// Persist a snapshot. Best-effort: write failures are logged and
    /// absorbed.
    #[instrument(skip_all, fields(items = snapshot.items.len()))]
    pub fn save(&self, snapshot: &CartSnapshot) {
        let payload = match serde_json::to_string(&snapshot.items) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize cart, keeping in-memory state");
                return;
            }
        };

        if let Err(e) = self.backend.set(CART_KEY, &payload) {
            error!(error = %e, "failed to persist cart, keeping in-memory state");
            return;
        }

        match &snapshot.discount.active {
            Some(promo) => {
                if let Err(e) = self.backend.set(PROMO_CODE_KEY, &promo.code) {
                    error!(error = %e, "failed to persist promo code");
                }
                if let Err(e) = self
                    .backend
                    .set(PROMO_DISCOUNT_KEY, &promo.amount.to_string())
                {
                    error!(error = %e, "failed to persist promo discount");
                }
            }
            None => {
                if let Err(e) = self.backend.remove(PROMO_CODE_KEY) {
                    error!(error = %e, "failed to clear persisted promo code");
                }
                if let Err(e) = self.backend.remove(PROMO_DISCOUNT_KEY) {
                    error!(error = %e, "failed to clear persisted promo discount");
                }
            }
        }

        debug!("cart persisted");
    }

    /// Subscribe to change notices from other handles of the same store.
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<StorageNotice>> {
        self.backend.subscribe()
    }

    fn load_items(&self) -> Vec<CartItem> {
        match self.backend.get(CART_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) if items_uphold_invariants(&items) => items,
                Ok(_) => {
                    warn!("persisted cart violates item invariants, starting empty");
                    Vec::new()
                }
                Err(e) => {
                    warn!(error = %e, "malformed persisted cart, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted cart, starting empty");
                Vec::new()
            }
        }
    }

    fn load_discount(&self) -> DiscountState {
        let code = match self.backend.get(PROMO_CODE_KEY) {
            Ok(Some(code)) if !code.is_empty() => code,
            Ok(_) => return DiscountState::default(),
            Err(e) => {
                warn!(error = %e, "failed to read persisted promo, starting without one");
                return DiscountState::default();
            }
        };

        let amount = match self.backend.get(PROMO_DISCOUNT_KEY) {
            Ok(Some(raw)) => match raw.parse::<Decimal>() {
                Ok(amount) if amount >= Decimal::ZERO => amount,
                Ok(_) | Err(_) => {
                    warn!(
                        code = %code,
                        raw = %raw,
                        "malformed persisted promo discount, dropping promo"
                    );
                    return DiscountState::default();
                }
            },
            Ok(None) => {
                warn!(code = %code, "persisted promo code without discount, dropping promo");
                return DiscountState::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to read persisted promo discount, dropping promo");
                return DiscountState::default();
            }
        };

        DiscountState {
            active: Some(ActivePromo { code, amount }),
        }
    }
}

/// Serialized items are untrusted input: the store is shared and a tampered
/// or corrupt value must degrade to the empty cart, never crash the engine.
/// Valid means non-negative prices, quantities of at least 1, unique ids.
fn items_uphold_invariants(items: &[CartItem]) -> bool {
    let mut seen = std::collections::HashSet::new();
    items.iter().all(|item| {
        item.unit_price >= Decimal::ZERO && item.quantity >= 1 && seen.insert(item.id.clone())
    })
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use driftwood_core::ProductRef;
    use rust_decimal_macros::dec;

    use super::*;

    fn store() -> (MemoryStore, PersistentStore) {
        let shared = MemoryStore::new();
        let persist = PersistentStore::new(Arc::new(shared.handle()));
        (shared, persist)
    }

    fn snapshot() -> CartSnapshot {
        let mut item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        item.quantity = 2;
        CartSnapshot {
            items: vec![item],
            discount: DiscountState {
                active: Some(ActivePromo {
                    code: "WELCOME10".to_owned(),
                    amount: dec!(7.8),
                }),
            },
        }
    }

    #[test]
    fn test_load_of_empty_store_is_empty() {
        let (_shared, persist) = store();
        assert_eq!(persist.load(), CartSnapshot::default());
    }

    #[test]
    fn test_round_trip_preserves_items_and_discount() {
        let (_shared, persist) = store();
        let snapshot = snapshot();
        persist.save(&snapshot);
        assert_eq!(persist.load(), snapshot);
    }

    #[test]
    fn test_saving_without_promo_clears_promo_keys() {
        let (shared, persist) = store();
        persist.save(&snapshot());
        persist.save(&CartSnapshot {
            items: snapshot().items,
            discount: DiscountState::default(),
        });

        let handle = shared.handle();
        assert_eq!(handle.get(PROMO_CODE_KEY).expect("get"), None);
        assert_eq!(handle.get(PROMO_DISCOUNT_KEY).expect("get"), None);
        assert!(persist.load().discount.active.is_none());
    }

    #[test]
    fn test_malformed_cart_loads_as_empty() {
        let (shared, persist) = store();
        shared
            .handle()
            .set(CART_KEY, "{not json")
            .expect("seed malformed value");
        let loaded = persist.load();
        assert!(loaded.items.is_empty());
    }

    #[test]
    fn test_negative_persisted_price_loads_as_empty() {
        let (shared, persist) = store();
        let mut item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        item.unit_price = dec!(-5);
        shared
            .handle()
            .set(CART_KEY, &serde_json::to_string(&vec![item]).expect("json"))
            .expect("seed tampered value");

        assert!(persist.load().items.is_empty());
    }

    #[test]
    fn test_zero_persisted_quantity_loads_as_empty() {
        let (shared, persist) = store();
        let mut item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        item.quantity = 0;
        shared
            .handle()
            .set(CART_KEY, &serde_json::to_string(&vec![item]).expect("json"))
            .expect("seed tampered value");

        assert!(persist.load().items.is_empty());
    }

    #[test]
    fn test_duplicate_persisted_ids_load_as_empty() {
        let (shared, persist) = store();
        let item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        let twin = item.clone();
        shared
            .handle()
            .set(
                CART_KEY,
                &serde_json::to_string(&vec![item, twin]).expect("json"),
            )
            .expect("seed tampered value");

        assert!(persist.load().items.is_empty());
    }

    #[test]
    fn test_malformed_discount_drops_promo_but_keeps_items() {
        let (shared, persist) = store();
        persist.save(&snapshot());
        shared
            .handle()
            .set(PROMO_DISCOUNT_KEY, "not-a-number")
            .expect("seed malformed value");

        let loaded = persist.load();
        assert_eq!(loaded.items.len(), 1);
        assert!(loaded.discount.active.is_none());
    }

    #[test]
    fn test_negative_persisted_discount_is_rejected() {
        let (shared, persist) = store();
        persist.save(&snapshot());
        shared
            .handle()
            .set(PROMO_DISCOUNT_KEY, "-5")
            .expect("seed malformed value");
        assert!(persist.load().discount.active.is_none());
    }

    #[test]
    fn test_promo_code_without_discount_is_dropped() {
        let (shared, persist) = store();
        shared
            .handle()
            .set(PROMO_CODE_KEY, "WELCOME10")
            .expect("seed code");
        assert!(persist.load().discount.active.is_none());
    }
}
