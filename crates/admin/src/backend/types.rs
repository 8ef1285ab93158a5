//! Backend orders API response types.

use chrono::{DateTime, Utc};
use marigold_core::{Money, OrderId, OrderStatus, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// A line item within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub variant_id: VariantId,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub unit_price: Money,
}

/// An order as returned by the backend orders API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number (e.g., "#1042")
    pub number: String,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub line_items: Vec<OrderLineItem>,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cursor-based pagination info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// A page of orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page_info: PageInfo,
}

/// Result of a status update accepted by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
}
