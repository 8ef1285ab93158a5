//! HTTP route handlers for the admin JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (pings backend)
//!
//! # Orders
//! GET    /api/orders                    - Order listing (paginated, filterable)
//! GET    /api/orders/{id}               - Order detail with selector state
//! POST   /api/orders/{id}/status        - Select a new status (pending)
//! POST   /api/orders/{id}/status/confirm - Confirm the pending status
//! DELETE /api/orders/{id}/status        - Cancel the pending status
//! ```

pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route(
            "/{id}/status",
            post(orders::select_status).delete(orders::cancel_status),
        )
        .route("/{id}/status/confirm", post(orders::confirm_status))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api/orders", order_routes())
}
