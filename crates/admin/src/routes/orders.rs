//! Order management route handlers.
//!
//! Status changes follow a two-phase flow: `POST /status` records a pending
//! selection, `POST /status/confirm` submits it to the backend. The backend
//! call happens only on confirm; a refusal rolls the selector back.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use marigold_core::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::types::{Order, OrderPage};
use crate::error::{AppError, Result};
use crate::orders::Transition;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub first: Option<u32>,
    pub after: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Default page size for order listings.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// Order detail plus the selector's current view of it.
#[derive(Debug, Serialize)]
pub struct OrderDetailView {
    #[serde(flatten)]
    pub order: Order,
    /// Status the control displays (pending value if one is selected)
    pub displayed_status: OrderStatus,
    /// Selected-but-unconfirmed status, if any
    pub pending_status: Option<OrderStatus>,
}

/// Status selection request body.
#[derive(Debug, Deserialize)]
pub struct SelectStatusRequest {
    pub status: OrderStatus,
}

/// Order listing (paginated, optionally filtered by status).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<OrderPage>> {
    let page = state
        .orders()
        .list_orders(
            Some(query.first.unwrap_or(DEFAULT_PAGE_SIZE)),
            query.after,
            query.status,
        )
        .await?;
    Ok(Json(page))
}

/// Order detail with selector state.
///
/// Seeds the order's selector from the backend status on first access.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetailView>> {
    let order = state.orders().get_order(&id).await?;

    let selector = state.selectors().get_or_seed(&id, order.status).await;
    let selector = selector.lock().await;

    Ok(Json(OrderDetailView {
        displayed_status: selector.displayed(),
        pending_status: selector.pending(),
        order,
    }))
}

/// Select a new status for an order (phase one, nothing hits the backend).
#[instrument(skip(state))]
pub async fn select_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<SelectStatusRequest>,
) -> Result<Json<Transition>> {
    let order = state.orders().get_order(&id).await?;

    let selector = state.selectors().get_or_seed(&id, order.status).await;
    let transition = selector.lock().await.select(body.status)?;

    Ok(Json(transition))
}

/// Confirm the pending status (phase two, submits to the backend).
///
/// A backend refusal is a 200 with a `rolled_back` transition; the order
/// keeps its last confirmed status.
#[instrument(skip(state))]
pub async fn confirm_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Transition>> {
    let selector = state
        .selectors()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("no status change pending for order {id}")))?;

    let transition = selector.lock().await.confirm(state.orders()).await?;

    if let Transition::RolledBack { reason, .. } = &transition {
        tracing::warn!(order_id = %id, reason = %reason, "Status update rejected by backend");
    }

    Ok(Json(transition))
}

/// Cancel the pending status selection.
#[instrument(skip(state))]
pub async fn cancel_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Transition>> {
    let selector = state
        .selectors()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("no status change pending for order {id}")))?;

    let transition = selector.lock().await.cancel()?;
    Ok(Json(transition))
}
