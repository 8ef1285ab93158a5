//! Cart route handlers.
//!
//! The guest cart is a local store; only add-to-cart reaches out to the
//! backend, to resolve authoritative variant data. Cart IDs are minted on
//! `POST /api/cart` and carried by the client on every call.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use marigold_core::{CartId, CartItem, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::CartStore;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Cart line as exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub variant_id: VariantId,
    pub product_slug: String,
    pub product_name: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub effective_price: Decimal,
    pub line_total: Decimal,
    pub image_url: Option<String>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            variant_id: item.variant_id.clone(),
            product_slug: item.product_slug.clone(),
            product_name: item.product_name.clone(),
            color: item.color.clone(),
            size: item.size.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price.amount,
            effective_price: item.effective_price.amount,
            line_total: item.line_total(),
            image_url: item.image_url.clone(),
        }
    }
}

/// Cart with derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart_id: CartId,
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub total: Decimal,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            cart_id: cart.cart_id(),
            items: cart.items().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }
}

/// Item count fragment.
#[derive(Debug, Clone, Serialize)]
pub struct CartCountView {
    pub cart_id: CartId,
    pub count: u32,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_slug: String,
    pub variant_id: VariantId,
    pub quantity: Option<u32>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Open a cart or fail with 404.
fn open_cart(state: &AppState, cart_id: CartId) -> Result<CartStore> {
    state
        .carts()
        .open(cart_id)?
        .ok_or_else(|| AppError::NotFound(format!("cart {cart_id}")))
}

/// Create a fresh guest cart.
#[instrument(skip(state))]
pub async fn create(State(state): State<AppState>) -> Result<(StatusCode, Json<CartView>)> {
    let cart = state.carts().create()?;
    Ok((StatusCode::CREATED, Json(CartView::from(&cart))))
}

/// Show a cart with derived totals.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartView>> {
    let cart = open_cart(&state, cart_id)?;
    Ok(Json(CartView::from(&cart)))
}

/// Item count badge data.
#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    Path(cart_id): Path<CartId>,
) -> Result<Json<CartCountView>> {
    let cart = open_cart(&state, cart_id)?;
    Ok(Json(CartCountView {
        cart_id,
        count: cart.item_count(),
    }))
}

/// Add a variant to the cart.
///
/// Resolves product/variant data from the backend; merges into an existing
/// line or appends a new one. A failed lookup leaves the cart unchanged.
#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<CartId>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, cart_id)?;
    cart.add_item(
        state.catalog(),
        &body.product_slug,
        &body.variant_id,
        body.quantity.unwrap_or(1),
    )
    .await?;

    Ok(Json(CartView::from(&cart)))
}

/// Replace the quantity of a line. Quantity 0 removes the line.
#[instrument(skip(state))]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path((cart_id, variant_id)): Path<(CartId, VariantId)>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, cart_id)?;
    cart.update_quantity(&variant_id, body.quantity)?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line. Unknown variants are a no-op.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, variant_id)): Path<(CartId, VariantId)>,
) -> Result<Json<CartView>> {
    let mut cart = open_cart(&state, cart_id)?;
    cart.remove_item(&variant_id)?;
    Ok(Json(CartView::from(&cart)))
}

/// Clear the cart entirely.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    Path(cart_id): Path<CartId>,
) -> Result<StatusCode> {
    let mut cart = open_cart(&state, cart_id)?;
    cart.clear()?;
    Ok(StatusCode::NO_CONTENT)
}
