//! Computed cart totals snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A point-in-time summary of the cart's arithmetic.
///
/// Published on the engine's debounced totals channel so badge-style UI can
/// refresh once per burst of mutations instead of once per click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of quantities across all items.
    pub count: u32,
    /// `sum(unit_price * quantity)` over all items.
    pub subtotal: Decimal,
    /// Active discount amount, already clamped to the subtotal.
    pub discount: Decimal,
    /// `max(0, subtotal - discount)`.
    pub total: Decimal,
}
