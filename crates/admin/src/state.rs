//! Shared application state for the admin panel.

use std::sync::Arc;

use crate::backend::OrdersClient;
use crate::config::AdminConfig;
use crate::orders::SelectorRegistry;

/// Cheap-to-clone handle shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    orders: OrdersClient,
    selectors: SelectorRegistry,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let orders = OrdersClient::new(&config.orders);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                orders,
                selectors: SelectorRegistry::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn orders(&self) -> &OrdersClient {
        &self.inner.orders
    }

    #[must_use]
    pub fn selectors(&self) -> &SelectorRegistry {
        &self.inner.selectors
    }
}
