//! Checkout/payment status page data.
//!
//! Payment capture happens on the backend; after the redirect back the
//! storefront only reads the resulting order status and maps it to the
//! outcome the status page renders.

use axum::{
    Json,
    extract::{Path, State},
};
use marigold_core::OrderStatus;
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Page-level outcome of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutOutcome {
    /// Payment captured (or the order has progressed beyond payment).
    Success,
    /// Payment not yet confirmed.
    Pending,
    /// Order was cancelled.
    Cancelled,
}

impl From<OrderStatus> for CheckoutOutcome {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Paid
            | OrderStatus::Processing
            | OrderStatus::Shipped
            | OrderStatus::Delivered => Self::Success,
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

/// Checkout status page data.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutStatusView {
    pub order_id: String,
    pub status: OrderStatus,
    pub outcome: CheckoutOutcome,
}

/// Fetch the order's status and map it to a page outcome.
#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<CheckoutStatusView>> {
    let doc = state.catalog().get_order_status(&order_id).await?;

    Ok(Json(CheckoutStatusView {
        order_id: doc.order_id,
        outcome: CheckoutOutcome::from(doc.status),
        status: doc.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        assert_eq!(
            CheckoutOutcome::from(OrderStatus::Paid),
            CheckoutOutcome::Success
        );
        assert_eq!(
            CheckoutOutcome::from(OrderStatus::Delivered),
            CheckoutOutcome::Success
        );
        assert_eq!(
            CheckoutOutcome::from(OrderStatus::Pending),
            CheckoutOutcome::Pending
        );
        assert_eq!(
            CheckoutOutcome::from(OrderStatus::Cancelled),
            CheckoutOutcome::Cancelled
        );
    }
}
