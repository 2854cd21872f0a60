//! Pure pricing arithmetic.
//!
//! No state, no I/O: every function here maps literal inputs to literal
//! outputs, which is what makes the arithmetic invariants directly testable.

use driftwood_core::{CartItem, CartTotals, DiscountState, PromoCode, PromoKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Sum of `unit_price * quantity` across all items.
#[must_use]
pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Resolve the discount a promo grants against the given subtotal.
///
/// - Percentage: `subtotal * rate / 100`
/// - Fixed: `min(amount, subtotal)` - a fixed code never exceeds the subtotal
/// - Shipping: zero; tracked for informational display only
#[must_use]
pub fn discount_for(subtotal: Decimal, promo: &PromoCode) -> Decimal {
    match promo.kind {
        PromoKind::Percentage => subtotal * promo.amount / dec!(100),
        PromoKind::Fixed => promo.amount.min(subtotal),
        PromoKind::Shipping => Decimal::ZERO,
    }
}

/// `max(0, subtotal - discount)`: the total never goes negative.
#[must_use]
pub fn total(subtotal: Decimal, discount: Decimal) -> Decimal {
    (subtotal - discount).max(Decimal::ZERO)
}

/// Full totals snapshot for a cart and its discount state.
#[must_use]
pub fn totals(items: &[CartItem], discount: &DiscountState) -> CartTotals {
    // subtotal can only go negative if an invariant-violating item slipped
    // in; totals must stay panic-free even then
    let subtotal = self::subtotal(items).max(Decimal::ZERO);
    // clamp a stale snapshot discount so the published numbers stay coherent
    let discount = discount.amount().max(Decimal::ZERO).min(subtotal);
    CartTotals {
        count: items.iter().map(|item| item.quantity).sum(),
        subtotal,
        discount,
        total: total(subtotal, discount),
    }
}

#[cfg(test)]
mod tests {
    use driftwood_core::{ActivePromo, ProductRef};
    use rust_decimal_macros::dec;

    use super::*;

    fn item(name: &str, price: Decimal, quantity: u32) -> CartItem {
        let mut item = CartItem::new(&ProductRef::new(name, price));
        item.quantity = quantity;
        item
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let items = vec![item("Mug", dec!(39), 2), item("Tote", dec!(24.50), 1)];
        assert_eq!(subtotal(&items), dec!(102.50));
    }

    #[test]
    fn test_subtotal_of_empty_cart_is_zero() {
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_discount() {
        let promo = PromoCode::new("WELCOME10", PromoKind::Percentage, dec!(10), "10% off");
        assert_eq!(discount_for(dec!(100), &promo), dec!(10));
        assert_eq!(discount_for(dec!(78), &promo), dec!(7.8));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let promo = PromoCode::new("FLAT20", PromoKind::Fixed, dec!(20), "$20 off");
        assert_eq!(discount_for(dec!(100), &promo), dec!(20));
        assert_eq!(discount_for(dec!(12), &promo), dec!(12));
    }

    #[test]
    fn test_shipping_discount_is_zero() {
        let promo = PromoCode::new("FREESHIP", PromoKind::Shipping, Decimal::ZERO, "Free shipping");
        assert_eq!(discount_for(dec!(100), &promo), Decimal::ZERO);
    }

    #[test]
    fn test_total_never_negative() {
        assert_eq!(total(dec!(10), dec!(25)), Decimal::ZERO);
        assert_eq!(total(dec!(25), dec!(10)), dec!(15));
        assert_eq!(total(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_totals_survives_invariant_violating_items() {
        // a tampered store can hand us a negative price; totals must not panic
        let mut bad = item("Mug", dec!(39), 1);
        bad.unit_price = dec!(-5);
        let discount = DiscountState {
            active: Some(ActivePromo {
                code: "FLAT20".to_owned(),
                amount: dec!(20),
            }),
        };
        let totals = totals(&[bad], &discount);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_totals_survives_negative_discount() {
        let items = vec![item("Mug", dec!(39), 1)];
        let discount = DiscountState {
            active: Some(ActivePromo {
                code: "FLAT20".to_owned(),
                amount: dec!(-3),
            }),
        };
        let totals = totals(&items, &discount);
        assert_eq!(totals.discount, Decimal::ZERO);
        assert_eq!(totals.total, dec!(39));
    }

    #[test]
    fn test_totals_clamps_stale_discount() {
        // a frozen snapshot discount can exceed the subtotal after removals
        let items = vec![item("Mug", dec!(5), 1)];
        let discount = DiscountState {
            active: Some(ActivePromo {
                code: "FLAT20".to_owned(),
                amount: dec!(20),
            }),
        };
        let totals = totals(&items, &discount);
        assert_eq!(totals.subtotal, dec!(5));
        assert_eq!(totals.discount, dec!(5));
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.count, 1);
    }
}
