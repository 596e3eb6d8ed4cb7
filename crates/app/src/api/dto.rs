//! Wire formats.
//!
//! Responses are decoded into these shapes and checked on conversion, so a
//! malformed body fails here instead of leaking half-filled values into the
//! stores.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storefront::{
    addresses::{Address, AddressForm, AddressId},
    attributes::AttributeSelection,
    cart::{Cart, CartLine, CartLineId, MIN_QUANTITY, ProductId},
    checkout::BillingAddress,
    orders::{OrderDetails, OrderId, OrderLine, OrderSummary},
};

use crate::api::{ApiError, OrderConfirmation};

#[derive(Debug, Deserialize)]
pub(crate) struct CartDto {
    #[serde(default)]
    items: Vec<CartItemDto>,

    #[serde(default)]
    order_discount: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CartItemDto {
    id: CartLineId,
    product_id: ProductId,
    product_name: String,
    #[serde(default)]
    image_url: Option<String>,
    unit_price: String,
    unit_price_value: Decimal,
    sub_total: String,
    sub_total_value: Decimal,
    quantity: i64,
    #[serde(default)]
    discount_value: Decimal,
}

impl TryFrom<CartItemDto> for CartLine {
    type Error = ApiError;

    fn try_from(item: CartItemDto) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(item.quantity)
            .ok()
            .filter(|quantity| *quantity >= MIN_QUANTITY)
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "cart line {} has quantity {}",
                    item.id, item.quantity
                ))
            })?;

        if item.unit_price_value.is_sign_negative() || item.sub_total_value.is_sign_negative() {
            return Err(ApiError::InvalidResponse(format!(
                "cart line {} has a negative price",
                item.id
            )));
        }

        Ok(Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            image_url: item.image_url,
            unit_price: item.unit_price,
            unit_price_value: item.unit_price_value,
            sub_total: item.sub_total,
            sub_total_value: item.sub_total_value,
            quantity,
            discount_value: item.discount_value,
        })
    }
}

impl TryFrom<CartDto> for Cart {
    type Error = ApiError;

    fn try_from(cart: CartDto) -> Result<Self, Self::Error> {
        let lines = cart
            .items
            .into_iter()
            .map(CartLine::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lines,
            order_discount: cart.order_discount,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddToCartRequest<'a> {
    pub product_id: ProductId,
    pub quantity: u32,
    pub attributes: &'a [AttributeSelection],
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApplyCouponRequest<'a> {
    pub discount_coupon_code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressesDto {
    #[serde(default)]
    addresses: Vec<AddressDto>,
}

impl From<AddressesDto> for Vec<Address> {
    fn from(dto: AddressesDto) -> Self {
        dto.addresses.into_iter().map(Address::from).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressDto {
    id: AddressId,
    #[serde(default)]
    label: String,
    #[serde(default)]
    phone_number: String,
    #[serde(default)]
    address1: String,
    #[serde(default)]
    address2: String,
    #[serde(default)]
    building_no: String,
    #[serde(default)]
    apartment_no: String,
    #[serde(default)]
    floor_no: String,
    #[serde(default)]
    city: String,
}

impl From<AddressDto> for Address {
    fn from(dto: AddressDto) -> Self {
        Self {
            id: dto.id,
            label: dto.label,
            phone_number: dto.phone_number,
            address1: dto.address1,
            address2: dto.address2,
            building_no: dto.building_no,
            apartment_no: dto.apartment_no,
            floor_no: dto.floor_no,
            city: dto.city,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddAddressRequest<'a> {
    pub address: &'a AddressForm,
}

#[derive(Debug, Serialize)]
pub(crate) struct EditAddressRequest<'a> {
    pub address_id: AddressId,
    pub address: &'a AddressForm,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewBillingAddressRequest<'a> {
    pub model: NewBillingAddressModel<'a>,
    pub form: EmptyForm,
}

impl<'a> NewBillingAddressRequest<'a> {
    pub(crate) fn new(billing: &'a BillingAddress) -> Self {
        Self {
            model: NewBillingAddressModel {
                billing_new_address: billing,
                ship_to_same_address: true,
            },
            form: EmptyForm {},
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewBillingAddressModel<'a> {
    pub billing_new_address: &'a BillingAddress,
    pub ship_to_same_address: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmptyForm {}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmOrderDto {
    #[serde(default)]
    redirect: Option<String>,

    #[serde(default)]
    order_id: Option<OrderId>,
}

impl From<ConfirmOrderDto> for OrderConfirmation {
    fn from(dto: ConfirmOrderDto) -> Self {
        Self {
            redirect: dto.redirect,
            order_id: dto.order_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub is_guest: bool,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginDto {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersDto {
    #[serde(default)]
    orders: Vec<OrderSummaryDto>,
}

impl From<OrdersDto> for Vec<OrderSummary> {
    fn from(dto: OrdersDto) -> Self {
        dto.orders.into_iter().map(OrderSummary::from).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderSummaryDto {
    id: OrderId,
    #[serde(default)]
    custom_order_number: String,
    order_total: String,
    #[serde(default)]
    order_status: String,
    #[serde(default)]
    payment_status: String,
    created_on: Timestamp,
}

impl From<OrderSummaryDto> for OrderSummary {
    fn from(dto: OrderSummaryDto) -> Self {
        Self {
            id: dto.id,
            custom_order_number: dto.custom_order_number,
            order_total: dto.order_total,
            order_status: dto.order_status,
            payment_status: dto.payment_status,
            created_on: dto.created_on,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderDetailsDto {
    #[serde(flatten)]
    summary: OrderSummaryDto,
    #[serde(default)]
    items: Vec<OrderItemDto>,
    #[serde(default)]
    order_subtotal: String,
    #[serde(default)]
    payment_method: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderItemDto {
    product_id: ProductId,
    product_name: String,
    unit_price: String,
    quantity: u32,
    sub_total: String,
}

impl From<OrderDetailsDto> for OrderDetails {
    fn from(dto: OrderDetailsDto) -> Self {
        Self {
            summary: dto.summary.into(),
            lines: dto
                .items
                .into_iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    sub_total: item.sub_total,
                })
                .collect(),
            order_subtotal: dto.order_subtotal,
            payment_method: dto.payment_method,
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDto {
    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    errors: Vec<String>,
}

impl ErrorDto {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
            .filter(|message| !message.trim().is_empty())
            .or_else(|| self.errors.into_iter().find(|error| !error.trim().is_empty()))
    }
}
