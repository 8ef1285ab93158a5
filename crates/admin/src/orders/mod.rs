//! Order status management.

mod selector;

pub use selector::{SelectorError, StatusEndpoint, StatusSelector, Transition};

use std::collections::HashMap;
use std::sync::Arc;

use marigold_core::{OrderId, OrderStatus};
use tokio::sync::Mutex;

/// One selector per order, created lazily on first access.
///
/// The per-order mutex serializes operations on a selector; two staff
/// sessions racing on the same order see each other's Busy/pending state
/// instead of clobbering it.
#[derive(Clone, Default)]
pub struct SelectorRegistry {
    selectors: Arc<Mutex<HashMap<OrderId, Arc<Mutex<StatusSelector>>>>>,
}

impl SelectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the selector for an order, seeding it with `committed` when the
    /// order has not been touched yet.
    pub async fn get_or_seed(
        &self,
        order_id: &OrderId,
        committed: OrderStatus,
    ) -> Arc<Mutex<StatusSelector>> {
        let mut selectors = self.selectors.lock().await;
        Arc::clone(selectors.entry(order_id.clone()).or_insert_with(|| {
            let mut selector = StatusSelector::new(order_id.clone(), committed);
            selector.set_on_commit(Box::new(|order_id, status| {
                tracing::info!(order_id = %order_id, status = %status, "Order status committed");
            }));
            Arc::new(Mutex::new(selector))
        }))
    }

    /// Get the selector for an order if one exists.
    pub async fn get(&self, order_id: &OrderId) -> Option<Arc<Mutex<StatusSelector>>> {
        self.selectors.lock().await.get(order_id).map(Arc::clone)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_seeds_once() {
        let registry = SelectorRegistry::new();
        let id = OrderId::new("ord_7");

        let first = registry.get_or_seed(&id, OrderStatus::Pending).await;
        first.lock().await.select(OrderStatus::Paid).unwrap();

        // Second access returns the same selector, not a fresh seed
        let second = registry.get_or_seed(&id, OrderStatus::Pending).await;
        assert_eq!(second.lock().await.pending(), Some(OrderStatus::Paid));
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_none() {
        let registry = SelectorRegistry::new();
        assert!(registry.get(&OrderId::new("missing")).await.is_none());
    }
}
