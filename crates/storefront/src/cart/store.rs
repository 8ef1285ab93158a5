//! The guest cart store.
//!
//! An explicit store object owning its line items - no ambient singleton.
//! Query methods are pure; mutation methods are transactional: the new state
//! is persisted before the in-memory state is committed, so a failed
//! operation leaves the store unchanged.

use std::sync::Arc;

use chrono::Utc;
use marigold_core::{CartId, CartItem, CartSnapshot, VariantId};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use crate::catalog::types::ResolvedVariant;
use crate::catalog::{CatalogError, VariantSource};

use super::storage::{CART_NAMESPACE, CartStorage, StorageError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Variant/product lookup against the backend failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Snapshot persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Quantity must be at least 1 when adding.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// Merged line quantity would exceed the representable range.
    #[error("Quantity too large")]
    QuantityOverflow,
}

/// A guest cart: line items plus a handle to the snapshot storage.
///
/// One entry per variant key; adding an existing variant increments its
/// quantity rather than duplicating the line.
pub struct CartStore {
    cart_id: CartId,
    items: Vec<CartItem>,
    storage: Arc<dyn CartStorage>,
}

impl CartStore {
    /// Create a fresh empty cart and persist its initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn create(storage: Arc<dyn CartStorage>) -> Result<Self, CartError> {
        let store = Self {
            cart_id: CartId::generate(),
            items: Vec::new(),
            storage,
        };
        store.persist(&store.items)?;
        Ok(store)
    }

    /// Open an existing cart from its persisted snapshot.
    ///
    /// Returns `None` when no snapshot exists for `cart_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or parsed.
    pub fn open(cart_id: CartId, storage: Arc<dyn CartStorage>) -> Result<Option<Self>, CartError> {
        let Some(raw) = storage.load(&snapshot_key(cart_id))? else {
            return Ok(None);
        };
        let snapshot: CartSnapshot =
            serde_json::from_str(&raw).map_err(StorageError::Serde)?;
        Ok(Some(Self {
            cart_id,
            items: snapshot.items,
            storage,
        }))
    }

    /// The cart's identifier.
    #[must_use]
    pub const fn cart_id(&self) -> CartId {
        self.cart_id
    }

    /// Current line items.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Cart total: sum of `effective_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add a variant to the cart.
    ///
    /// Resolves authoritative product/variant data through `source`; merges
    /// into an existing line for the same variant or appends a new one. On
    /// any failure (lookup or persistence) the store state is unchanged.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`] when `quantity` is 0
    /// - [`CartError::QuantityOverflow`] when merging would push the line
    ///   past `u32::MAX`
    /// - [`CartError::Catalog`] when the product or variant does not exist or
    ///   the backend is unreachable
    /// - [`CartError::Storage`] when the snapshot cannot be written
    #[instrument(skip(self, source), fields(cart_id = %self.cart_id))]
    pub async fn add_item<S: VariantSource>(
        &mut self,
        source: &S,
        product_slug: &str,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let resolved = source.resolve_variant(product_slug, variant_id).await?;

        let mut next = self.items.clone();
        match next.iter_mut().find(|item| &item.variant_id == variant_id) {
            Some(line) => {
                // Quantities arrive unbounded from the request body; a merge
                // that would wrap is rejected instead
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow)?;
            }
            None => next.push(new_line(resolved, quantity)),
        }

        self.commit(next)
    }

    /// Replace the quantity of the line for `variant_id`.
    ///
    /// A quantity of 0 removes the line. Unknown variants are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub fn update_quantity(
        &mut self,
        variant_id: &VariantId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(variant_id);
        }

        let Some(position) = self
            .items
            .iter()
            .position(|item| &item.variant_id == variant_id)
        else {
            return Ok(());
        };

        let mut next = self.items.clone();
        if let Some(line) = next.get_mut(position) {
            line.quantity = quantity;
        }
        self.commit(next)
    }

    /// Remove the line for `variant_id`. Unknown variants are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub fn remove_item(&mut self, variant_id: &VariantId) -> Result<(), CartError> {
        if !self.items.iter().any(|item| &item.variant_id == variant_id) {
            return Ok(());
        }

        let next: Vec<CartItem> = self
            .items
            .iter()
            .filter(|item| &item.variant_id != variant_id)
            .cloned()
            .collect();
        self.commit(next)
    }

    /// Remove all lines and delete the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    #[instrument(skip(self), fields(cart_id = %self.cart_id))]
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.storage.remove(&snapshot_key(self.cart_id))?;
        self.items.clear();
        Ok(())
    }

    /// Persist `next`, then commit it as the in-memory state.
    fn commit(&mut self, next: Vec<CartItem>) -> Result<(), CartError> {
        self.persist(&next)?;
        self.items = next;
        Ok(())
    }

    fn persist(&self, items: &[CartItem]) -> Result<(), StorageError> {
        let snapshot = CartSnapshot {
            cart_id: self.cart_id,
            items: items.to_vec(),
            updated_at: Utc::now(),
        };
        let raw = serde_json::to_string(&snapshot)?;
        self.storage.save(&snapshot_key(self.cart_id), &raw)
    }
}

/// Storage key for a cart's snapshot, under the fixed namespace.
fn snapshot_key(cart_id: CartId) -> String {
    format!("{CART_NAMESPACE}:{cart_id}")
}

/// Build a fresh cart line from resolved variant data.
fn new_line(resolved: ResolvedVariant, quantity: u32) -> CartItem {
    CartItem {
        product_id: resolved.product_id,
        product_name: resolved.product_name,
        product_slug: resolved.product_slug,
        variant_id: resolved.variant_id,
        color: resolved.color,
        size: resolved.size,
        quantity,
        unit_price: resolved.unit_price,
        effective_price: resolved.effective_price,
        image_url: resolved.image_url,
        added_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::Future;

    use marigold_core::{CurrencyCode, Money, ProductId};

    use super::*;
    use crate::cart::storage::MemoryStorage;

    /// Stub variant source backed by a fixed list of variants.
    struct StubSource {
        variants: Vec<ResolvedVariant>,
    }

    impl StubSource {
        fn with(variants: Vec<ResolvedVariant>) -> Self {
            Self { variants }
        }
    }

    impl VariantSource for StubSource {
        fn resolve_variant(
            &self,
            product_slug: &str,
            variant_id: &VariantId,
        ) -> impl Future<Output = Result<ResolvedVariant, CatalogError>> + Send {
            let found = self
                .variants
                .iter()
                .find(|v| v.product_slug == product_slug && &v.variant_id == variant_id)
                .cloned();
            async move {
                found.ok_or_else(|| CatalogError::NotFound(format!("variant {variant_id}")))
            }
        }
    }

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2), CurrencyCode::USD)
    }

    fn resolved(variant: &str, price_cents: i64) -> ResolvedVariant {
        ResolvedVariant {
            product_id: ProductId::new("prod_1"),
            product_name: "Linen Shirt".to_string(),
            product_slug: "linen-shirt".to_string(),
            variant_id: VariantId::new(variant),
            color: "Sand".to_string(),
            size: "M".to_string(),
            unit_price: money(price_cents),
            effective_price: money(price_cents),
            image_url: None,
        }
    }

    fn new_store() -> CartStore {
        CartStore::create(Arc::new(MemoryStorage::new())).unwrap()
    }

    #[tokio::test]
    async fn test_add_same_variant_merges_into_one_line() {
        let source = StubSource::with(vec![resolved("SKU-A", 10000)]);
        let mut cart = new_store();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 3)
            .await
            .unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        // 5 * $100.00
        assert_eq!(cart.total(), Decimal::new(50000, 2));
    }

    #[tokio::test]
    async fn test_add_distinct_variants_appends_lines() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500), resolved("SKU-B", 1000)]);
        let mut cart = new_store();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 1)
            .await
            .unwrap();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-B"), 2)
            .await
            .unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 3);
        // $25.00 + 2 * $10.00
        assert_eq!(cart.total(), Decimal::new(4500, 2));
    }

    #[tokio::test]
    async fn test_add_unknown_variant_fails_and_leaves_state_unchanged() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 1)
            .await
            .unwrap();

        let result = cart
            .add_item(&source, "linen-shirt", &VariantId::new("SKU-MISSING"), 1)
            .await;
        assert!(matches!(
            result,
            Err(CartError::Catalog(CatalogError::NotFound(_)))
        ));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_add_zero_quantity_rejected() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();

        let result = cart
            .add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 0)
            .await;
        assert!(matches!(result, Err(CartError::ZeroQuantity)));
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_add_overflowing_merge_rejected_and_state_unchanged() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), u32::MAX)
            .await
            .unwrap();

        let result = cart
            .add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await;
        assert!(matches!(result, Err(CartError::QuantityOverflow)));

        // The failed merge must not wrap or mutate the line
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[tokio::test]
    async fn test_item_count_saturates_across_lines() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500), resolved("SKU-B", 1000)]);
        let mut cart = new_store();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), u32::MAX)
            .await
            .unwrap();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-B"), 5)
            .await
            .unwrap();

        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[tokio::test]
    async fn test_update_quantity_replaces_value() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();

        cart.update_quantity(&VariantId::new("SKU-A"), 7).unwrap();
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();

        cart.update_quantity(&VariantId::new("SKU-A"), 0).unwrap();
        assert!(cart.items().is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_update_quantity_unknown_variant_is_noop() {
        let mut cart = new_store();
        cart.update_quantity(&VariantId::new("SKU-GHOST"), 3).unwrap();
        assert!(cart.items().is_empty());
    }

    #[tokio::test]
    async fn test_remove_item_unknown_variant_is_noop() {
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = new_store();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();

        cart.remove_item(&VariantId::new("SKU-GHOST")).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_clear_empties_cart_and_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let source = StubSource::with(vec![resolved("SKU-A", 2500)]);
        let mut cart = CartStore::create(Arc::clone(&storage) as Arc<dyn CartStorage>).unwrap();
        let cart_id = cart.cart_id();

        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();
        cart.clear().unwrap();

        assert!(cart.items().is_empty());
        assert!(
            CartStore::open(cart_id, storage as Arc<dyn CartStorage>)
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let storage: Arc<dyn CartStorage> = Arc::new(MemoryStorage::new());
        let source = StubSource::with(vec![resolved("SKU-A", 10000)]);

        let mut cart = CartStore::create(Arc::clone(&storage)).unwrap();
        let cart_id = cart.cart_id();
        cart.add_item(&source, "linen-shirt", &VariantId::new("SKU-A"), 2)
            .await
            .unwrap();
        drop(cart);

        let reopened = CartStore::open(cart_id, storage).unwrap().unwrap();
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.items()[0].quantity, 2);
        assert_eq!(reopened.total(), Decimal::new(20000, 2));
    }

    #[test]
    fn test_open_unknown_cart_returns_none() {
        let storage: Arc<dyn CartStorage> = Arc::new(MemoryStorage::new());
        assert!(CartStore::open(CartId::generate(), storage).unwrap().is_none());
    }
}
