//! Domain types for the backend catalog API.
//!
//! These mirror the JSON documents the backend returns. The backend is the
//! source of truth for products, collections, and orders; nothing here is
//! synced locally.

use marigold_core::{Money, OrderStatus, ProductId, VariantId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Product Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
}

/// A product variant (a specific color/size combination).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    /// SKU-like variant key, unique per product.
    pub sku: VariantId,
    /// Variant color.
    pub color: String,
    /// Variant size.
    pub size: String,
    /// Whether this variant is available for sale.
    pub available: bool,
    /// Listed price.
    pub price: Money,
    /// Discounted price, when a promotion is active.
    pub sale_price: Option<Money>,
}

impl Variant {
    /// Price actually charged: the sale price when present, else the list price.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        self.sale_price.unwrap_or(self.price)
    }
}

/// A product in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Backend document ID.
    pub id: ProductId,
    /// URL slug.
    pub slug: String,
    /// Product display name.
    pub name: String,
    /// Plain text description.
    pub description: String,
    /// Whether any variant is available.
    pub available: bool,
    /// Product tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Product images (first one is the featured image).
    #[serde(default)]
    pub images: Vec<Image>,
    /// Product variants.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Find a variant by its SKU-like key.
    #[must_use]
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.sku == variant_id)
    }

    /// Featured image URL, when the product has any images.
    #[must_use]
    pub fn featured_image_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

/// Authoritative variant data resolved for a cart line.
///
/// Built from a product lookup at add-to-cart time; everything a
/// [`marigold_core::CartItem`] denormalizes comes from here.
#[derive(Debug, Clone)]
pub struct ResolvedVariant {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub variant_id: VariantId,
    pub color: String,
    pub size: String,
    pub unit_price: Money,
    pub effective_price: Money,
    pub image_url: Option<String>,
}

impl ResolvedVariant {
    /// Combine a product and one of its variants.
    #[must_use]
    pub fn from_product(product: &Product, variant: &Variant) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_slug: product.slug.clone(),
            variant_id: variant.sku.clone(),
            color: variant.color.clone(),
            size: variant.size.clone(),
            unit_price: variant.price,
            effective_price: variant.effective_price(),
            image_url: product.featured_image_url().map(String::from),
        }
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A curated collection of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Backend document ID.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Collection display name.
    pub name: String,
    /// Plain text description.
    pub description: String,
    /// Collection image.
    pub image: Option<Image>,
    /// Products in this collection.
    #[serde(default)]
    pub products: Vec<Product>,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Cursor pagination information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor for the last item, to pass as `after`.
    pub end_cursor: Option<String>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

/// Paginated list of collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionPage {
    /// Collections in this page.
    pub collections: Vec<Collection>,
    /// Pagination info.
    pub page_info: PageInfo,
}

// =============================================================================
// Order Types
// =============================================================================

/// Order status document, consumed by the checkout status pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusDoc {
    /// Backend order ID.
    pub order_id: String,
    /// Current order status.
    pub status: OrderStatus,
}

// =============================================================================
// Sort Keys
// =============================================================================

/// Sort keys for product queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSortKey {
    /// Sort by name.
    Name,
    /// Sort by price.
    Price,
    /// Sort by creation date.
    CreatedAt,
    /// Sort by best selling.
    BestSelling,
}

impl ProductSortKey {
    /// Query-string value the backend expects.
    #[must_use]
    pub const fn as_query_value(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::CreatedAt => "created_at",
            Self::BestSelling => "best_selling",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marigold_core::CurrencyCode;
    use rust_decimal::Decimal;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    fn product_with_sale() -> Product {
        Product {
            id: ProductId::new("prod_1"),
            slug: "linen-shirt".to_string(),
            name: "Linen Shirt".to_string(),
            description: String::new(),
            available: true,
            tags: vec![],
            images: vec![Image {
                url: "https://img.test/shirt.jpg".to_string(),
                alt_text: None,
            }],
            variants: vec![Variant {
                sku: VariantId::new("SKU-SAND-M"),
                color: "Sand".to_string(),
                size: "M".to_string(),
                available: true,
                price: money(4900),
                sale_price: Some(money(3900)),
            }],
        }
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let product = product_with_sale();
        let variant = product.variant(&VariantId::new("SKU-SAND-M")).unwrap();
        assert_eq!(variant.effective_price(), money(3900));
    }

    #[test]
    fn test_effective_price_without_sale() {
        let mut product = product_with_sale();
        product.variants[0].sale_price = None;
        assert_eq!(product.variants[0].effective_price(), money(4900));
    }

    #[test]
    fn test_variant_lookup_miss() {
        let product = product_with_sale();
        assert!(product.variant(&VariantId::new("SKU-NOPE")).is_none());
    }

    #[test]
    fn test_resolved_variant_denormalizes_product() {
        let product = product_with_sale();
        let variant = product.variant(&VariantId::new("SKU-SAND-M")).unwrap();
        let resolved = ResolvedVariant::from_product(&product, variant);
        assert_eq!(resolved.product_slug, "linen-shirt");
        assert_eq!(resolved.unit_price, money(4900));
        assert_eq!(resolved.effective_price, money(3900));
        assert_eq!(resolved.image_url.as_deref(), Some("https://img.test/shirt.jpg"));
    }
}
