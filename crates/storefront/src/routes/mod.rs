//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//! GET  /health/ready                        - Readiness check (pings backend)
//!
//! # Products
//! GET    /api/products                      - Product listing (paginated)
//! GET    /api/products/{slug}               - Product detail
//! GET    /api/collections                   - Collection listing
//! GET    /api/collections/{slug}            - Collection detail
//!
//! # Cart
//! POST   /api/cart                          - Create a guest cart
//! GET    /api/cart/{id}                     - Cart with derived totals
//! GET    /api/cart/{id}/count               - Item count only
//! POST   /api/cart/{id}/items               - Add a variant
//! PATCH  /api/cart/{id}/items/{variant_id}  - Replace quantity (0 removes)
//! DELETE /api/cart/{id}/items/{variant_id}  - Remove a line
//! DELETE /api/cart/{id}                     - Clear the cart
//!
//! # Checkout
//! GET    /api/checkout/{order_id}           - Payment/checkout status page data
//! ```

pub mod cart;
pub mod checkout;
pub mod collections;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/{slug}", get(collections::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::create))
        .route("/{id}", get(cart::show).delete(cart::clear))
        .route("/{id}/count", get(cart::count))
        .route("/{id}/items", post(cart::add_item))
        .route(
            "/{id}/items/{variant_id}",
            delete(cart::remove_item).patch(cart::update_quantity),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/collections", collection_routes())
        .nest("/api/cart", cart_routes())
        .route("/api/checkout/{order_id}", get(checkout::status))
}
