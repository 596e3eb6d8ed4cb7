//! Order history store.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use storefront::orders::{OrderDetails, OrderId, OrderSummary};

use crate::{
    api::{ApiError, CommerceApi},
    notifications::{Notification, Notifier},
    stores::{read, write},
};

#[derive(Debug, Error)]
pub enum OrderHistoryError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHistoryState {
    pub orders: Vec<OrderSummary>,
    pub details: FxHashMap<OrderId, OrderDetails>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Read-only view of the customer's past orders.
pub struct OrderHistoryStore {
    api: Arc<dyn CommerceApi>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<OrderHistoryState>,
}

impl fmt::Debug for OrderHistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderHistoryStore")
            .field("state", &*read(&self.state))
            .finish_non_exhaustive()
    }
}

impl OrderHistoryStore {
    #[must_use]
    pub fn new(api: Arc<dyn CommerceApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            state: RwLock::new(OrderHistoryState::default()),
        }
    }

    pub async fn fetch_orders(&self) -> Result<Vec<OrderSummary>, OrderHistoryError> {
        write(&self.state).is_loading = true;

        let result = self.api.list_orders().await;

        write(&self.state).is_loading = false;

        let orders = result.map_err(|error| self.fail("fetch_orders", error))?;

        debug!(count = orders.len(), "orders fetched");

        let mut state = write(&self.state);
        state.orders.clone_from(&orders);
        state.error = None;

        Ok(orders)
    }

    /// Load one order's details and cache them.
    pub async fn fetch_order(&self, id: OrderId) -> Result<OrderDetails, OrderHistoryError> {
        write(&self.state).is_loading = true;

        let result = self.api.get_order(id).await;

        write(&self.state).is_loading = false;

        let details = result.map_err(|error| self.fail("fetch_order", error))?;

        let mut state = write(&self.state);
        state.details.insert(id, details.clone());
        state.error = None;

        Ok(details)
    }

    #[must_use]
    pub fn snapshot(&self) -> OrderHistoryState {
        read(&self.state).clone()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<OrderSummary> {
        read(&self.state).orders.clone()
    }

    /// Details loaded earlier by [`Self::fetch_order`].
    #[must_use]
    pub fn details(&self, id: OrderId) -> Option<OrderDetails> {
        read(&self.state).details.get(&id).cloned()
    }

    fn fail(&self, operation: &'static str, error: ApiError) -> OrderHistoryError {
        let message = error.user_message();

        warn!(operation, %error, "order request failed");

        write(&self.state).error = Some(message.clone());
        self.notifier.notify(Notification::error(message));

        error.into()
    }
}
