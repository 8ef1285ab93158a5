//! Cart line items and the persisted snapshot form.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CartId, ProductId, VariantId};
use crate::types::money::Money;

/// A single line in a guest cart.
///
/// One line per variant; the variant ID is the uniqueness key. Product data
/// is denormalized at add time from the authoritative catalog so the cart can
/// render without further lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Backend product ID.
    pub product_id: ProductId,
    /// Product display name.
    pub product_name: String,
    /// URL slug of the product.
    pub product_slug: String,
    /// Variant (SKU-like) key - unique within a cart.
    pub variant_id: VariantId,
    /// Variant color.
    pub color: String,
    /// Variant size.
    pub size: String,
    /// Quantity in the cart (at least 1 once stored).
    pub quantity: u32,
    /// Listed unit price.
    pub unit_price: Money,
    /// Price actually charged per unit (after any active discount).
    pub effective_price: Money,
    /// Primary product image.
    pub image_url: Option<String>,
    /// When the line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Line total: `effective_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.effective_price.amount * Decimal::from(self.quantity)
    }
}

/// The serialized form of a cart, written to local storage as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Cart this snapshot belongs to.
    pub cart_id: CartId,
    /// Cart lines.
    pub items: Vec<CartItem>,
    /// When the snapshot was last written.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::money::CurrencyCode;

    fn item(variant: &str, quantity: u32, price: Decimal) -> CartItem {
        CartItem {
            product_id: ProductId::new("prod_1"),
            product_name: "Linen Shirt".to_string(),
            product_slug: "linen-shirt".to_string(),
            variant_id: VariantId::new(variant),
            color: "Sand".to_string(),
            size: "M".to_string(),
            quantity,
            unit_price: Money::new(price, CurrencyCode::USD),
            effective_price: Money::new(price, CurrencyCode::USD),
            image_url: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        let line = item("SKU-A", 3, Decimal::new(2500, 2));
        assert_eq!(line.line_total(), Decimal::new(7500, 2));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = CartSnapshot {
            cart_id: CartId::generate(),
            items: vec![item("SKU-A", 2, Decimal::new(100, 0))],
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CartSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cart_id, snapshot.cart_id);
        assert_eq!(back.items.len(), 1);
        assert_eq!(back.items[0].quantity, 2);
    }
}
