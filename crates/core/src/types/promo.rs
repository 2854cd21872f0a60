//! Promo codes and discount state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a promo code reduces the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    /// `amount` is a percentage of the subtotal (e.g. 10 means 10% off).
    Percentage,
    /// `amount` is a fixed currency amount, capped at the subtotal.
    Fixed,
    /// Free shipping; contributes no discount amount, tracked for display.
    Shipping,
}

/// A catalog entry. Codes are static and not user-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    /// Canonical (uppercase) code string.
    pub code: String,
    /// Discount semantics.
    pub kind: PromoKind,
    /// Percentage rate or fixed amount, depending on `kind`.
    pub amount: Decimal,
    /// Human-readable description used in notifications.
    pub description: String,
}

impl PromoCode {
    /// Create a catalog entry.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        kind: PromoKind,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind,
            amount,
            description: description.into(),
        }
    }
}

/// The currently applied promo, with its discount resolved at application
/// time. The amount is a snapshot: it is not recomputed when the cart
/// changes afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePromo {
    /// The canonical code that was applied.
    pub code: String,
    /// Resolved discount in currency units (not a percentage).
    pub amount: Decimal,
}

/// Discount state for a cart: at most one promo active at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountState {
    /// The active promo, if any.
    pub active: Option<ActivePromo>,
}

impl DiscountState {
    /// The discount amount to subtract from the subtotal (zero when no
    /// promo is active).
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.active
            .as_ref()
            .map_or(Decimal::ZERO, |promo| promo.amount)
    }

    /// Whether `code` (case-insensitive) is the active promo.
    #[must_use]
    pub fn is_active(&self, code: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|promo| promo.code.eq_ignore_ascii_case(code))
    }
}

/// Summary returned to the caller after a successful promo application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromo {
    /// Canonical code that was applied.
    pub code: String,
    /// Resolved discount amount.
    pub discount: Decimal,
    /// Catalog description for display.
    pub description: String,
}
