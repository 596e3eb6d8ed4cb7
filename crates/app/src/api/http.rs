//! reqwest client for the storefront REST API.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use storefront::{
    addresses::{Address, AddressForm, AddressId},
    cart::{Cart, ProductId},
    checkout::{BillingAddress, PaymentMethod},
    orders::{OrderDetails, OrderId, OrderSummary},
};

use crate::{
    api::{
        ApiError, CommerceApi, NewCartItem, OrderConfirmation,
        dto::{
            AddAddressRequest, AddToCartRequest, AddressDto, AddressesDto, ApplyCouponRequest,
            CartDto, ConfirmOrderDto, EditAddressRequest, ErrorDto, LoginDto, LoginRequest,
            NewBillingAddressRequest, OrderDetailsDto, OrdersDto, UpdateQuantityRequest,
        },
    },
    session::{Credentials, CustomerToken, Session},
};

/// Talks to the commerce backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCommerceApi {
    base_url: Url,
    http: Client,
    session: Arc<Session>,
}

impl HttpCommerceApi {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL cannot be parsed or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, timeout: Duration, session: Arc<Session>) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|error| ApiError::InvalidUrl(error.to_string()))?;

        // Url::join drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http,
            session,
        })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|error| ApiError::InvalidUrl(format!("{path}: {error}")))?;

        debug!(%method, %url, "sending request");

        let token = self.session.bearer_token();

        Ok(self.http.request(method, url).bearer_auth(token.as_str()))
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorDto>(&text)
            .ok()
            .and_then(ErrorDto::into_message);

        warn!(status = status.as_u16(), ?message, "request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await?;

        serde_json::from_slice(&bytes).map_err(|error| ApiError::InvalidResponse(error.to_string()))
    }
}

#[async_trait]
impl CommerceApi for HttpCommerceApi {
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "api-frontend/ShoppingCart/Cart")?;

        Self::decode::<CartDto>(request).await?.try_into()
    }

    async fn add_to_cart(&self, item: NewCartItem) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/ShoppingCart/AddProductToCart")?
            .json(&AddToCartRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                attributes: &item.attributes,
            });

        Self::send(request).await?;

        Ok(())
    }

    async fn update_quantity(&self, product: ProductId, quantity: u32) -> Result<Cart, ApiError> {
        let request = self
            .request(
                Method::PUT,
                &format!("api-frontend/ShoppingCart/UpdateQuantity/{product}"),
            )?
            .json(&UpdateQuantityRequest { quantity });

        Self::decode::<CartDto>(request).await?.try_into()
    }

    async fn remove_item(&self, product: ProductId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &format!("api-frontend/ShoppingCart/RemoveItem/{product}"),
        )?;

        Self::send(request).await?;

        Ok(())
    }

    async fn apply_coupon(&self, code: String) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/ShoppingCart/ApplyDiscountCoupon")?
            .json(&ApplyCouponRequest {
                discount_coupon_code: &code,
            });

        Self::send(request).await?;

        Ok(())
    }

    async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let request = self.request(Method::GET, "api-frontend/Customer/Addresses")?;

        Ok(Self::decode::<AddressesDto>(request).await?.into())
    }

    async fn add_address(&self, address: AddressForm) -> Result<Address, ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/Customer/AddressAdd")?
            .json(&AddAddressRequest { address: &address });

        Ok(Self::decode::<AddressDto>(request).await?.into())
    }

    async fn edit_address(
        &self,
        id: AddressId,
        address: AddressForm,
    ) -> Result<Address, ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/Customer/AddressEdit")?
            .json(&EditAddressRequest {
                address_id: id,
                address: &address,
            });

        Ok(Self::decode::<AddressDto>(request).await?.into())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), ApiError> {
        let request = self.request(
            Method::DELETE,
            &format!("api-frontend/Customer/AddressDelete/{id}"),
        )?;

        Self::send(request).await?;

        Ok(())
    }

    async fn submit_billing_address(&self, address: BillingAddress) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/Checkout/NewBillingAddress")?
            .json(&NewBillingAddressRequest::new(&address));

        Self::send(request).await?;

        Ok(())
    }

    async fn select_payment_method(&self, method: PaymentMethod) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/Checkout/SelectPaymentMethod")?
            .query(&[("paymentMethod", method.system_name())]);

        Self::send(request).await?;

        Ok(())
    }

    async fn confirm_order(&self) -> Result<OrderConfirmation, ApiError> {
        let request = self.request(Method::POST, "api-frontend/Checkout/ConfirmOrder")?;

        Ok(Self::decode::<ConfirmOrderDto>(request).await?.into())
    }

    async fn login(&self, credentials: Credentials) -> Result<CustomerToken, ApiError> {
        let request = self
            .request(Method::POST, "api-frontend/Authenticate/GetToken")?
            .json(&LoginRequest {
                is_guest: false,
                email: &credentials.email,
                password: credentials.password.as_str(),
            });

        let login: LoginDto = Self::decode(request).await?;

        if login.token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("login returned an empty token".to_string()));
        }

        Ok(CustomerToken::new(login.token))
    }

    async fn list_orders(&self) -> Result<Vec<OrderSummary>, ApiError> {
        let request = self.request(Method::GET, "api-frontend/Order/CustomerOrders")?;

        Ok(Self::decode::<OrdersDto>(request).await?.into())
    }

    async fn get_order(&self, id: OrderId) -> Result<OrderDetails, ApiError> {
        let request = self.request(Method::GET, &format!("api-frontend/Order/Details/{id}"))?;

        Ok(Self::decode::<OrderDetailsDto>(request).await?.into())
    }
}
