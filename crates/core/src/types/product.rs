//! Product reference supplied by the UI layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as handed to the cart engine by the calling UI layer.
///
/// The engine never inspects presentation markup; whoever handles the
/// "add to cart" interaction is responsible for producing one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Display name; also the source of the derived [`ItemId`](crate::ItemId).
    pub name: String,
    /// Unit price in the store currency. Negative prices are treated as zero.
    pub unit_price: Decimal,
}

impl ProductRef {
    /// Create a new product reference.
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            unit_price,
        }
    }
}
