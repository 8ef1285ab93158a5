//! Cache value wrapper for the catalog client.

use super::types::{Collection, CollectionPage, Product, ProductPage};

/// Values stored in the read cache.
///
/// Large single documents are boxed so all variants stay close in size.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ProductPage),
    Collection(Box<Collection>),
    Collections(CollectionPage),
}
