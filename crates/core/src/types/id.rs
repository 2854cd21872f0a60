//! Item identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A cart item identifier, derived deterministically from the product name.
///
/// Two products with the same name always derive the same id, which is what
/// lets repeated adds collapse into a quantity increment instead of a
/// duplicate line.
///
/// ## Derivation rules
///
/// - Lowercased (ASCII)
/// - Every run of non-alphanumeric characters collapses to a single `-`
/// - Leading and trailing `-` are trimmed
/// - Truncated to [`ItemId::MAX_LENGTH`] characters
///
/// ## Examples
///
/// ```
/// use driftwood_core::ItemId;
///
/// assert_eq!(ItemId::derive("Stoneware Mug").as_str(), "stoneware-mug");
/// assert_eq!(ItemId::derive("  Mug!!  (12 oz) ").as_str(), "mug-12-oz");
/// assert_eq!(ItemId::derive("Stoneware Mug"), ItemId::derive("stoneware mug"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Maximum length of a derived id.
    pub const MAX_LENGTH: usize = 48;

    /// Derive an id from a product name.
    ///
    /// Pure and deterministic: the same name always produces the same id.
    #[must_use]
    pub fn derive(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len().min(Self::MAX_LENGTH));
        let mut pending_dash = false;

        for c in name.chars() {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }

        slug.truncate(Self::MAX_LENGTH);
        while slug.ends_with('-') {
            slug.pop();
        }

        Self(slug)
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
