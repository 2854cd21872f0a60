//! Core types for Driftwood.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item;
pub mod product;
pub mod promo;
pub mod totals;

pub use id::ItemId;
pub use item::CartItem;
pub use product::ProductRef;
pub use promo::{ActivePromo, AppliedPromo, DiscountState, PromoCode, PromoKind};
pub use totals::CartTotals;
