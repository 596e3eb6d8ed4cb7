//! Test Helpers

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::task::yield_now;

use storefront::{
    addresses::{Address, AddressForm, AddressId},
    cart::{Cart, CartLine, CartLineId, ProductId},
    checkout::{BillingAddress, NewAddress, PaymentMethod, PersonalInfo},
    orders::{OrderDetails, OrderId, OrderSummary},
};

use crate::{
    api::{ApiError, CommerceApi, MockCommerceApi, NewCartItem, OrderConfirmation},
    notifications::NotificationQueue,
    session::{Credentials, CustomerToken},
    stores::{AddressBookStore, AssumeYes, CartStore},
};

pub(crate) fn cart_line(product: u32, quantity: u32, unit_price: i64) -> CartLine {
    let unit = Decimal::from(unit_price);
    let sub_total = unit * Decimal::from(quantity);

    CartLine {
        id: CartLineId::new(product + 1000),
        product_id: ProductId::new(product),
        product_name: format!("Product {product}"),
        image_url: None,
        unit_price: format!("${unit}.00"),
        unit_price_value: unit,
        sub_total: format!("${sub_total}.00"),
        sub_total_value: sub_total,
        quantity,
        discount_value: Decimal::ZERO,
    }
}

pub(crate) fn make_cart(lines: Vec<CartLine>) -> Cart {
    Cart {
        lines,
        order_discount: Decimal::ZERO,
    }
}

pub(crate) fn make_address(id: u32) -> Address {
    AddressForm {
        label: format!("Address {id}"),
        phone_number: "0100000000".to_string(),
        address1: format!("{id} Nile Street"),
        address2: "Building 4, Floor 2, Apartment 8".to_string(),
        city: "Cairo".to_string(),
        ..AddressForm::default()
    }
    .into_address(AddressId::new(id))
}

pub(crate) fn address_form(label: &str) -> AddressForm {
    AddressForm {
        label: label.to_string(),
        phone_number: "0111111111".to_string(),
        address1: "Tahrir Square".to_string(),
        address2: "Building 1".to_string(),
        city: "Cairo".to_string(),
        ..AddressForm::default()
    }
}

pub(crate) fn personal_info() -> PersonalInfo {
    PersonalInfo {
        full_name: "Ada Lovelace".to_string(),
        phone_number: "0123456789".to_string(),
        email: "ada@example.com".to_string(),
        new_address: NewAddress {
            street: "Nile Street".to_string(),
            building_no: "4".to_string(),
            apartment_no: "8".to_string(),
            floor_no: "2".to_string(),
            notes: String::new(),
            city: "Cairo".to_string(),
        },
    }
}

pub(crate) fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 400,
        message: Some(message.to_string()),
    }
}

pub(crate) fn cart_store(api: MockCommerceApi) -> (CartStore, Arc<NotificationQueue>) {
    let notifications = Arc::new(NotificationQueue::new());

    (
        CartStore::new(Arc::new(api), notifications.clone()),
        notifications,
    )
}

pub(crate) fn address_store(api: MockCommerceApi) -> (AddressBookStore, Arc<NotificationQueue>) {
    let notifications = Arc::new(NotificationQueue::new());

    (
        AddressBookStore::new(Arc::new(api), notifications.clone(), Arc::new(AssumeYes)),
        notifications,
    )
}

/// Yields to the runtime before every call, so joined callers interleave
/// while a request is in flight.
pub(crate) struct YieldingApi(pub(crate) MockCommerceApi);

#[async_trait]
impl CommerceApi for YieldingApi {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        yield_now().await;
        self.0.get_cart().await
    }

    async fn add_to_cart(&self, item: NewCartItem) -> Result<(), ApiError> {
        yield_now().await;
        self.0.add_to_cart(item).await
    }

    async fn update_quantity(&self, product: ProductId, quantity: u32) -> Result<Cart, ApiError> {
        yield_now().await;
        self.0.update_quantity(product, quantity).await
    }

    async fn remove_item(&self, product: ProductId) -> Result<(), ApiError> {
        yield_now().await;
        self.0.remove_item(product).await
    }

    async fn apply_coupon(&self, code: String) -> Result<(), ApiError> {
        yield_now().await;
        self.0.apply_coupon(code).await
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        yield_now().await;
        self.0.list_addresses().await
    }

    async fn add_address(&self, address: AddressForm) -> Result<Address, ApiError> {
        yield_now().await;
        self.0.add_address(address).await
    }

    async fn edit_address(
        &self,
        id: AddressId,
        address: AddressForm,
    ) -> Result<Address, ApiError> {
        yield_now().await;
        self.0.edit_address(id, address).await
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        yield_now().await;
        self.0.delete_address(id).await
    }

    async fn submit_billing_address(&self, address: BillingAddress) -> Result<(), ApiError> {
        yield_now().await;
        self.0.submit_billing_address(address).await
    }

    async fn select_payment_method(&self, method: PaymentMethod) -> Result<(), ApiError> {
        yield_now().await;
        self.0.select_payment_method(method).await
    }

    async fn confirm_order(&self) -> Result<OrderConfirmation, ApiError> {
        yield_now().await;
        self.0.confirm_order().await
    }

    async fn login(&self, credentials: Credentials) -> Result<CustomerToken, ApiError> {
        yield_now().await;
        self.0.login(credentials).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        yield_now().await;
        self.0.list_orders().await
    }

    async fn get_order(&self, id: OrderId) -> Result<OrderDetails, ApiError> {
        yield_now().await;
        self.0.get_order(id).await
    }
}
