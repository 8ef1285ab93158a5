//! Guest cart: store, snapshot storage, and the service handed to routes.
//!
//! Carts belong to unauthenticated guests and are not backend orders yet;
//! they live entirely in local storage until checkout.

pub mod storage;
pub mod store;

use std::sync::Arc;

use marigold_core::CartId;

pub use storage::{CART_NAMESPACE, CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{CartError, CartStore};

/// Factory for cart stores, shared across handlers.
#[derive(Clone)]
pub struct CartService {
    storage: Arc<dyn CartStorage>,
}

impl CartService {
    /// Create a service over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self { storage }
    }

    /// Create a fresh empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot cannot be written.
    pub fn create(&self) -> Result<CartStore, CartError> {
        CartStore::create(Arc::clone(&self.storage))
    }

    /// Open an existing cart, or `None` if no snapshot exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or parsed.
    pub fn open(&self, cart_id: CartId) -> Result<Option<CartStore>, CartError> {
        CartStore::open(cart_id, Arc::clone(&self.storage))
    }
}
