//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    api::{ApiError, CommerceApi, HttpCommerceApi},
    checkout::CheckoutController,
    config::ApiConfig,
    notifications::Notifier,
    session::{CustomerToken, Session},
    stores::{AddressBookStore, CartStore, Confirm, OrderHistoryStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build api client")]
    Api(#[source] ApiError),
}

/// Every store and controller, wired to one API client and session.
#[derive(Clone)]
pub struct AppContext {
    pub session: Arc<Session>,
    pub api: Arc<dyn CommerceApi>,
    pub cart: Arc<CartStore>,
    pub addresses: Arc<AddressBookStore>,
    pub orders: Arc<OrderHistoryStore>,
    pub checkout: Arc<CheckoutController>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context talking to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the API client cannot be built.
    pub fn from_config(
        config: &ApiConfig,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Result<Self, AppInitError> {
        let session = Arc::new(match config.customer_token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                Session::signed_in(config.guest_token.as_str(), CustomerToken::new(token))
            }
            _ => Session::guest(config.guest_token.as_str()),
        });

        let api = HttpCommerceApi::new(&config.api_url, config.timeout(), session.clone())
            .map_err(AppInitError::Api)?;

        Ok(Self::with_api(Arc::new(api), session, notifier, confirm))
    }

    /// Build application context around an existing client.
    #[must_use]
    pub fn with_api(
        api: Arc<dyn CommerceApi>,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        let cart = Arc::new(CartStore::new(api.clone(), notifier.clone()));
        let addresses = Arc::new(AddressBookStore::new(
            api.clone(),
            notifier.clone(),
            confirm,
        ));
        let orders = Arc::new(OrderHistoryStore::new(api.clone(), notifier.clone()));

        let checkout = Arc::new(CheckoutController::new(
            api.clone(),
            session.clone(),
            cart.clone(),
            addresses.clone(),
            notifier,
        ));

        Self {
            session,
            api,
            cart,
            addresses,
            orders,
            checkout,
        }
    }
}
