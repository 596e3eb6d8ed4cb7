//! Orders
//!
//! Read-only views of placed orders.

use jiff::Timestamp;

use crate::{cart::ProductId, ids::TypedId};

/// Order id
pub type OrderId = TypedId<OrderSummary>;

/// One row of the customer's order history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    /// Order id.
    pub id: OrderId,

    /// Customer-facing order number.
    pub custom_order_number: String,

    /// Formatted order total.
    pub order_total: String,

    /// Fulfilment status.
    pub order_status: String,

    /// Payment status.
    pub payment_status: String,

    /// When the order was placed.
    pub created_on: Timestamp,
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Ordered product.
    pub product_id: ProductId,

    /// Product name at the time of ordering.
    pub product_name: String,

    /// Formatted unit price.
    pub unit_price: String,

    /// Ordered quantity.
    pub quantity: u32,

    /// Formatted line subtotal.
    pub sub_total: String,
}

/// Full detail of a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDetails {
    /// Summary fields.
    pub summary: OrderSummary,

    /// Ordered lines.
    pub lines: Vec<OrderLine>,

    /// Formatted subtotal.
    pub order_subtotal: String,

    /// Payment method display name.
    pub payment_method: String,
}
