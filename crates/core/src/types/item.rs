//! Cart line item.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ItemId;
use crate::types::product::ProductRef;

/// A single line in the cart.
///
/// Identity is the derived [`ItemId`]; no two items in one cart share an id.
/// `quantity` is always at least 1 - a quantity of zero is expressed by
/// removing the item, never by storing a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable identity derived from the product name.
    pub id: ItemId,
    /// Display name as supplied by the UI layer.
    pub name: String,
    /// Unit price in the store currency, never negative.
    pub unit_price: Decimal,
    /// Number of units, always >= 1.
    pub quantity: u32,
    /// When the item first entered the cart.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Create a fresh line item (quantity 1) from a product reference.
    #[must_use]
    pub fn new(product: &ProductRef) -> Self {
        Self {
            id: ItemId::derive(&product.name),
            name: product.name.clone(),
            unit_price: product.unit_price.max(Decimal::ZERO),
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// Price of this line: `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_new_derives_id_and_starts_at_one() {
        let item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        assert_eq!(item.id.as_str(), "stoneware-mug");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price, dec!(39));
    }

    #[test]
    fn test_negative_price_clamped_to_zero() {
        let item = CartItem::new(&ProductRef::new("Free Sticker", dec!(-1)));
        assert_eq!(item.unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_line_total() {
        let mut item = CartItem::new(&ProductRef::new("Stoneware Mug", dec!(39)));
        item.quantity = 3;
        assert_eq!(item.line_total(), dec!(117));
    }

    #[test]
    fn test_serde_round_trip() {
        let item = CartItem::new(&ProductRef::new("Canvas Tote", dec!(24.50)));
        let json = serde_json::to_string(&item).expect("serialize");
        let back: CartItem = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, item);
    }
}
