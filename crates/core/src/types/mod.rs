//! Shared domain types.

pub mod cart;
pub mod id;
pub mod money;
pub mod status;

pub use cart::{CartItem, CartSnapshot};
pub use id::{CartId, OrderId, ProductId, VariantId};
pub use money::{CurrencyCode, Money};
pub use status::OrderStatus;
