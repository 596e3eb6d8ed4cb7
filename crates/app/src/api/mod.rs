//! Commerce API

mod dto;
mod errors;
mod http;

use async_trait::async_trait;
use mockall::automock;

use storefront::{
    addresses::{Address, AddressForm, AddressId},
    attributes::AttributeSelections,
    cart::{Cart, ProductId},
    checkout::{BillingAddress, PaymentMethod},
    orders::{OrderDetails, OrderId, OrderSummary},
};

use crate::session::{Credentials, CustomerToken};

pub use errors::{ApiError, FALLBACK_MESSAGE};
pub use http::HttpCommerceApi;

/// Value of `redirect` once an order has been placed.
pub const COMPLETED_REDIRECT: &str = "completed";

/// A product to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub attributes: AttributeSelections,
}

/// Result of asking the backend to confirm the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub redirect: Option<String>,
    pub order_id: Option<OrderId>,
}

impl OrderConfirmation {
    /// Whether the order was actually placed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.redirect
            .as_deref()
            .is_some_and(|redirect| redirect.eq_ignore_ascii_case(COMPLETED_REDIRECT))
    }
}

#[automock]
#[async_trait]
pub trait CommerceApi: Send + Sync {
    /// Fetch the current cart.
    async fn get_cart(&self) -> Result<Cart, ApiError>;

    /// Add a product, with its attribute choices, to the cart.
    async fn add_to_cart(&self, item: NewCartItem) -> Result<(), ApiError>;

    /// Set the quantity of a cart line and return the updated cart.
    async fn update_quantity(&self, product: ProductId, quantity: u32) -> Result<Cart, ApiError>;

    /// Remove a product from the cart.
    async fn remove_item(&self, product: ProductId) -> Result<(), ApiError>;

    /// Apply a discount coupon to the cart.
    async fn apply_coupon(&self, code: String) -> Result<(), ApiError>;

    /// Fetch the customer's saved addresses.
    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError>;

    async fn add_address(&self, address: AddressForm) -> Result<Address, ApiError>;

    async fn edit_address(&self, id: AddressId, address: AddressForm)
    -> Result<Address, ApiError>;

    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError>;

    /// Submit the billing address for the order being checked out.
    async fn submit_billing_address(&self, address: BillingAddress) -> Result<(), ApiError>;

    async fn select_payment_method(&self, method: PaymentMethod) -> Result<(), ApiError>;

    /// Ask the backend to place the order.
    async fn confirm_order(&self) -> Result<OrderConfirmation, ApiError>;

    /// Exchange credentials for a customer token.
    async fn login(&self, credentials: Credentials) -> Result<CustomerToken, ApiError>;

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, ApiError>;

    async fn get_order(&self, id: OrderId) -> Result<OrderDetails, ApiError>;
}
