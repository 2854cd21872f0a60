//! Driftwood Cart - the cart state engine.
//!
//! This crate owns the authoritative in-memory cart for one session ("tab"),
//! persists it to an origin-scoped key-value store shared by all sessions of
//! the same browser profile, keeps sessions eventually consistent through a
//! storage-notice subscription plus a fallback poll, and publishes a narrow
//! set of typed notifications that UI collaborators subscribe to.
//!
//! # Components
//!
//! - [`store::CartStore`] - the authoritative cart: mutations, promo state,
//!   read accessors
//! - [`pricing`] - pure subtotal/discount/total arithmetic
//! - [`persist::PersistentStore`] - best-effort serialization over a
//!   [`persist::StorageBackend`]
//! - [`debounce::Debouncer`] - trailing-edge coalescing for persistence and
//!   totals refresh
//! - [`sync::SyncCoordinator`] - startup/notice/poll reconciliation
//! - [`events::EventBus`] - the typed cart-changed/promo notification surface
//!
//! # Consistency model
//!
//! Within one session all operations run to completion in call order. Across
//! sessions the only shared resource is the persistent store; convergence is
//! eventual, last-writer-wins at full-snapshot granularity. A session may
//! observe a stale cart for up to the poll interval if storage notices are
//! not delivered.
//!
//! The engine requires a tokio runtime: debounced work and the poll are
//! deferred tasks, never blocking calls.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod persist;
pub mod pricing;
pub mod store;
pub mod sync;

pub use catalog::PromoCatalog;
pub use config::CartConfig;
pub use debounce::Debouncer;
pub use error::{PromoError, StorageError};
pub use events::{CartChange, CartEvent, EventBus};
pub use persist::{CartSnapshot, JsonFileBackend, MemoryStore, PersistentStore, StorageBackend};
pub use store::CartStore;
pub use sync::SyncCoordinator;
