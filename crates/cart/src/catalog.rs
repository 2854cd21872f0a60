//! Static promo catalog.

use driftwood_core::{PromoCode, PromoKind};
use rust_decimal_macros::dec;

/// The set of promo codes the store honors. Lookup is case-insensitive;
/// codes are stored in canonical uppercase form.
#[derive(Debug, Clone)]
pub struct PromoCatalog {
    codes: Vec<PromoCode>,
}

impl PromoCatalog {
    /// Build a catalog from explicit entries (used by tests and seasonal
    /// overrides).
    #[must_use]
    pub const fn with_codes(codes: Vec<PromoCode>) -> Self {
        Self { codes }
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<&PromoCode> {
        let code = code.trim();
        self.codes
            .iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(code))
    }

    /// All catalog entries, in display order.
    #[must_use]
    pub fn codes(&self) -> &[PromoCode] {
        &self.codes
    }
}

impl Default for PromoCatalog {
    fn default() -> Self {
        Self::with_codes(vec![
            PromoCode::new(
                "WELCOME10",
                PromoKind::Percentage,
                dec!(10),
                "10% off your first order",
            ),
            PromoCode::new(
                "SAVE15",
                PromoKind::Percentage,
                dec!(15),
                "15% off your order",
            ),
            PromoCode::new("FLAT20", PromoKind::Fixed, dec!(20), "$20 off your order"),
            PromoCode::new(
                "FREESHIP",
                PromoKind::Shipping,
                dec!(0),
                "Free standard shipping",
            ),
        ])
    }
}
