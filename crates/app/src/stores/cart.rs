//! Cart synchronization store.

use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

use storefront::{
    attributes::AttributeSelections,
    cart::{Cart, CartLine, MIN_QUANTITY, ProductId, validate_quantity},
    pricing::CartTotals,
    validation::{Field, ValidationErrors, is_blank},
};

use crate::{
    api::{ApiError, CommerceApi, NewCartItem},
    notifications::{Notification, Notifier},
    stores::{read, write},
};

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid cart input: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Snapshot of the cart as the UI sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub cart: Cart,
    pub is_loading: bool,
    pub error: Option<String>,
    pub updating: FxHashSet<ProductId>,
    pub removing: FxHashSet<ProductId>,
}

#[derive(Debug, Default)]
struct Inner {
    state: CartState,
    latest_update: FxHashMap<ProductId, u64>,
    next_sequence: u64,
}

/// Mirrors the server cart and serializes per-line mutations.
pub struct CartStore {
    api: Arc<dyn CommerceApi>,
    notifier: Arc<dyn Notifier>,
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &read(&self.inner).state)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    #[must_use]
    pub fn new(api: Arc<dyn CommerceApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Reload the whole cart from the server.
    ///
    /// On failure the previous lines are kept.
    pub async fn fetch_cart_items(&self) -> Result<(), CartStoreError> {
        write(&self.inner).state.is_loading = true;

        let result = self.api.get_cart().await;

        {
            let mut inner = write(&self.inner);
            inner.state.is_loading = false;

            if let Ok(cart) = &result {
                debug!(lines = cart.len(), "cart fetched");

                inner.state.cart = cart.clone();
                inner.state.error = None;
            }
        }

        result.map(drop).map_err(|error| self.fail("fetch_cart", error))
    }

    /// Add `quantity` of `product` to the cart, then reload it.
    pub async fn add_to_cart(
        &self,
        product: ProductId,
        quantity: u32,
        attributes: AttributeSelections,
    ) -> Result<(), CartStoreError> {
        validate_quantity(quantity)?;

        self.api
            .add_to_cart(NewCartItem {
                product_id: product,
                quantity,
                attributes,
            })
            .await
            .map_err(|error| self.fail("add_to_cart", error))?;

        info!(%product, quantity, "product added to cart");

        self.notifier
            .notify(Notification::success("Product added to cart"));

        self.fetch_cart_items().await
    }

    /// Set the quantity of the line holding `product`.
    ///
    /// Nothing changes locally until the server answers. A response that
    /// arrives after a newer update for the same product was sent is ignored.
    pub async fn update_quantity(
        &self,
        product: ProductId,
        quantity: u32,
    ) -> Result<(), CartStoreError> {
        validate_quantity(quantity)?;

        let sequence = self.begin_update(product);
        let result = self.api.update_quantity(product, quantity).await;

        self.finish_update(product, sequence, result)
    }

    /// Raise the line's quantity by one.
    pub async fn increment(&self, product: ProductId) -> Result<(), CartStoreError> {
        let Some(quantity) = self.quantity(product) else {
            debug!(%product, "increment ignored, product not in cart");
            return Ok(());
        };

        self.update_quantity(product, quantity.saturating_add(1))
            .await
    }

    /// Lower the line's quantity by one. Does nothing at the minimum.
    pub async fn decrement(&self, product: ProductId) -> Result<(), CartStoreError> {
        match self.quantity(product) {
            Some(quantity) if quantity > MIN_QUANTITY => {
                self.update_quantity(product, quantity - 1).await
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn can_decrement(&self, product: ProductId) -> bool {
        self.quantity(product)
            .is_some_and(|quantity| quantity > MIN_QUANTITY)
    }

    /// Remove the line holding `product`.
    pub async fn remove_item(&self, product: ProductId) -> Result<(), CartStoreError> {
        write(&self.inner).state.removing.insert(product);

        let result = self.api.remove_item(product).await;

        {
            let mut inner = write(&self.inner);
            inner.state.removing.remove(&product);

            if result.is_ok() {
                inner.state.cart.remove_line(product);
                inner.state.error = None;
            }
        }

        result.map_err(|error| self.fail("remove_item", error))?;

        info!(%product, "product removed from cart");

        Ok(())
    }

    /// Apply a discount coupon, then reload the cart to pick up the discount.
    pub async fn apply_coupon(&self, code: &str) -> Result<(), CartStoreError> {
        if is_blank(code) {
            return Err(ValidationErrors::single(Field::CouponCode, "Enter a coupon code").into());
        }

        self.api
            .apply_coupon(code.trim().to_string())
            .await
            .map_err(|error| self.fail("apply_coupon", error))?;

        self.notifier.notify(Notification::success("Coupon applied"));

        self.fetch_cart_items().await
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        read(&self.inner).state.clone()
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        read(&self.inner).state.cart.clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        read(&self.inner).state.cart.lines.clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.inner).state.cart.is_empty()
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        read(&self.inner).state.cart.totals()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.totals().subtotal
    }

    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.totals().discount
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.totals().total
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        read(&self.inner).state.is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        read(&self.inner).state.error.clone()
    }

    #[must_use]
    pub fn is_updating(&self, product: ProductId) -> bool {
        read(&self.inner).state.updating.contains(&product)
    }

    #[must_use]
    pub fn is_removing(&self, product: ProductId) -> bool {
        read(&self.inner).state.removing.contains(&product)
    }

    fn quantity(&self, product: ProductId) -> Option<u32> {
        read(&self.inner)
            .state
            .cart
            .line(product)
            .map(|line| line.quantity)
    }

    fn begin_update(&self, product: ProductId) -> u64 {
        let mut inner = write(&self.inner);

        inner.next_sequence += 1;
        let sequence = inner.next_sequence;

        inner.latest_update.insert(product, sequence);
        inner.state.updating.insert(product);

        sequence
    }

    fn finish_update(
        &self,
        product: ProductId,
        sequence: u64,
        result: Result<Cart, ApiError>,
    ) -> Result<(), CartStoreError> {
        {
            let mut inner = write(&self.inner);

            if inner.latest_update.get(&product) != Some(&sequence) {
                debug!(%product, sequence, "discarding stale quantity response");
                return Ok(());
            }

            inner.latest_update.remove(&product);
            inner.state.updating.remove(&product);

            if let Ok(cart) = &result {
                let replaced = cart
                    .line(product)
                    .is_some_and(|line| inner.state.cart.replace_line(line.clone()));

                if replaced {
                    inner.state.cart.order_discount = cart.order_discount;
                } else {
                    inner.state.cart = cart.clone();
                }

                inner.state.error = None;
            }
        }

        result
            .map(drop)
            .map_err(|error| self.fail("update_quantity", error))
    }

    fn fail(&self, operation: &'static str, error: ApiError) -> CartStoreError {
        let message = error.user_message();

        warn!(operation, %error, "cart request failed");

        write(&self.inner).state.error = Some(message.clone());
        self.notifier.notify(Notification::error(message));

        error.into()
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use storefront::attributes::{AttributeId, AttributeSelection, AttributeValueId};

    use crate::{
        api::MockCommerceApi,
        notifications::NotificationLevel,
        test::{cart_line, cart_store, make_cart, server_error},
    };

    use super::*;

    async fn loaded_store(
        mut api: MockCommerceApi,
        cart: Cart,
    ) -> Result<(CartStore, Arc<crate::notifications::NotificationQueue>), CartStoreError> {
        api.expect_get_cart()
            .once()
            .return_once(move || Ok(cart));

        let (store, notifications) = cart_store(api);
        store.fetch_cart_items().await?;

        Ok((store, notifications))
    }

    #[tokio::test]
    async fn test_fetch_replaces_lines() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_get_cart()
            .once()
            .return_once(|| Ok(make_cart(vec![cart_line(1, 2, 10), cart_line(2, 1, 5)])));

        let (store, notifications) = cart_store(api);

        store.fetch_cart_items().await?;

        assert_eq!(store.lines().len(), 2);
        assert_eq!(store.subtotal(), Decimal::from(25));
        assert!(!store.is_loading());
        assert!(notifications.drain().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_lines() -> TestResult {
        let mut api = MockCommerceApi::new();
        let mut calls = 0;

        api.expect_get_cart().times(2).returning(move || {
            calls += 1;

            if calls == 1 {
                Ok(make_cart(vec![cart_line(1, 2, 10)]))
            } else {
                Err(server_error("Backend unavailable"))
            }
        });

        let (store, notifications) = cart_store(api);

        store.fetch_cart_items().await?;
        notifications.drain();

        let result = store.fetch_cart_items().await;

        assert!(
            matches!(result, Err(CartStoreError::Api(_))),
            "expected api error, got {result:?}"
        );
        assert_eq!(store.lines(), vec![cart_line(1, 2, 10)]);
        assert!(!store.is_loading());
        assert_eq!(store.error().as_deref(), Some("Backend unavailable"));
        assert_eq!(
            notifications.drain(),
            vec![Notification::error("Backend unavailable")]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_replaces_only_affected_line() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity()
            .once()
            .withf(|product, quantity| *product == ProductId::new(42) && *quantity == 3)
            .return_once(|_, _| {
                // The server's copy of product 7 is stale; only 42 should be taken.
                Ok(make_cart(vec![cart_line(7, 9, 1), cart_line(42, 3, 50)]))
            });

        let (store, _) = loaded_store(
            api,
            make_cart(vec![cart_line(7, 1, 1), cart_line(42, 2, 50)]),
        )
        .await?;

        store.update_quantity(ProductId::new(42), 3).await?;

        assert_eq!(store.lines(), vec![cart_line(7, 1, 1), cart_line(42, 3, 50)]);
        assert_eq!(store.subtotal(), Decimal::from(151));
        assert!(!store.is_updating(ProductId::new(42)));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_quantity_adopts_server_cart_when_line_missing() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity()
            .once()
            .return_once(|_, _| Ok(make_cart(vec![cart_line(2, 1, 5)])));

        let (store, _) = loaded_store(api, make_cart(vec![cart_line(1, 1, 10)])).await?;

        store.update_quantity(ProductId::new(1), 2).await?;

        assert_eq!(store.lines(), vec![cart_line(2, 1, 5)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_without_request() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity().never();
        api.expect_add_to_cart().never();

        let (store, notifications) = loaded_store(api, make_cart(vec![cart_line(1, 2, 10)])).await?;

        let update = store.update_quantity(ProductId::new(1), 0).await;
        let add = store
            .add_to_cart(ProductId::new(1), 0, AttributeSelections::new())
            .await;

        assert!(
            matches!(update, Err(CartStoreError::Validation(_))),
            "expected validation error, got {update:?}"
        );
        assert!(
            matches!(add, Err(CartStoreError::Validation(_))),
            "expected validation error, got {add:?}"
        );
        assert_eq!(store.lines(), vec![cart_line(1, 2, 10)]);
        assert!(notifications.drain().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_update_keeps_line_and_notifies() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity()
            .once()
            .return_once(|_, _| Err(server_error("Only 2 left in stock")));

        let (store, notifications) = loaded_store(api, make_cart(vec![cart_line(1, 2, 10)])).await?;

        let result = store.update_quantity(ProductId::new(1), 5).await;

        assert!(result.is_err(), "expected failure");
        assert_eq!(store.lines(), vec![cart_line(1, 2, 10)]);
        assert!(!store.is_updating(ProductId::new(1)));
        assert_eq!(store.error().as_deref(), Some("Only 2 left in stock"));
        assert_eq!(
            notifications.drain(),
            vec![Notification::error("Only 2 left in stock")]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_stale_quantity_response_is_discarded() -> TestResult {
        let (store, _) =
            loaded_store(MockCommerceApi::new(), make_cart(vec![cart_line(1, 1, 10)])).await?;

        let product = ProductId::new(1);
        let first = store.begin_update(product);
        let second = store.begin_update(product);

        store.finish_update(product, second, Ok(make_cart(vec![cart_line(1, 3, 10)])))?;

        assert!(!store.is_updating(product));

        store.finish_update(product, first, Ok(make_cart(vec![cart_line(1, 2, 10)])))?;

        assert_eq!(store.lines(), vec![cart_line(1, 3, 10)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_busy_flag_is_scoped_to_one_line() -> TestResult {
        let (store, _) = loaded_store(
            MockCommerceApi::new(),
            make_cart(vec![cart_line(1, 1, 10), cart_line(2, 1, 10)]),
        )
        .await?;

        let first = store.begin_update(ProductId::new(1));
        let older = store.begin_update(ProductId::new(2));
        let newer = store.begin_update(ProductId::new(2));

        assert!(store.is_updating(ProductId::new(1)));
        assert!(store.is_updating(ProductId::new(2)));

        store.finish_update(ProductId::new(2), older, Err(server_error("stale")))?;

        assert!(
            store.is_updating(ProductId::new(2)),
            "only the latest request clears the flag"
        );

        store.finish_update(ProductId::new(1), first, Ok(make_cart(vec![cart_line(1, 2, 10)])))?;

        assert!(!store.is_updating(ProductId::new(1)));
        assert!(store.is_updating(ProductId::new(2)));

        store.finish_update(ProductId::new(2), newer, Ok(make_cart(vec![cart_line(2, 4, 10)])))?;

        assert!(store.snapshot().updating.is_empty());
        assert_eq!(store.subtotal(), Decimal::from(60));

        Ok(())
    }

    #[tokio::test]
    async fn test_decrement_at_minimum_issues_no_request() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity().never();

        let (store, _) = loaded_store(api, make_cart(vec![cart_line(1, 1, 10)])).await?;

        assert!(!store.can_decrement(ProductId::new(1)));

        store.decrement(ProductId::new(1)).await?;

        assert_eq!(store.lines(), vec![cart_line(1, 1, 10)]);

        Ok(())
    }

    #[tokio::test]
    async fn test_increment_sends_next_quantity() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_update_quantity()
            .once()
            .withf(|product, quantity| *product == ProductId::new(42) && *quantity == 3)
            .return_once(|_, _| Ok(make_cart(vec![cart_line(42, 3, 50)])));

        let (store, _) = loaded_store(api, make_cart(vec![cart_line(42, 2, 50)])).await?;

        store.increment(ProductId::new(42)).await?;

        assert_eq!(store.subtotal(), Decimal::from(150));

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_last_line_leaves_empty_cart() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_remove_item()
            .once()
            .withf(|product| *product == ProductId::new(1))
            .return_once(|_| Ok(()));

        let (store, _) = loaded_store(api, make_cart(vec![cart_line(1, 2, 10)])).await?;

        store.remove_item(ProductId::new(1)).await?;

        assert!(store.is_empty());
        assert_eq!(store.total(), Decimal::ZERO);
        assert!(!store.is_removing(ProductId::new(1)));
        assert_eq!(store.error(), None);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_line() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_remove_item()
            .once()
            .return_once(|_| Err(server_error("Cannot remove item")));

        let (store, notifications) = loaded_store(api, make_cart(vec![cart_line(1, 2, 10)])).await?;

        let result = store.remove_item(ProductId::new(1)).await;

        assert!(result.is_err(), "expected failure");
        assert_eq!(store.lines().len(), 1);
        assert!(!store.is_removing(ProductId::new(1)));
        assert_eq!(
            notifications.drain(),
            vec![Notification::error("Cannot remove item")]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_add_to_cart_refreshes() -> TestResult {
        let mut api = MockCommerceApi::new();
        let selections: AttributeSelections = smallvec![AttributeSelection {
            attribute_id: AttributeId::new(3),
            value_id: AttributeValueId::new(11),
        }];
        let expected = selections.clone();

        api.expect_add_to_cart()
            .once()
            .withf(move |item| {
                item.product_id == ProductId::new(5)
                    && item.quantity == 2
                    && item.attributes == expected
            })
            .return_once(|_| Ok(()));

        api.expect_get_cart()
            .once()
            .return_once(|| Ok(make_cart(vec![cart_line(5, 2, 20)])));

        let (store, notifications) = cart_store(api);

        store.add_to_cart(ProductId::new(5), 2, selections).await?;

        assert_eq!(store.lines(), vec![cart_line(5, 2, 20)]);
        assert!(
            notifications
                .drain()
                .iter()
                .all(|notification| notification.level == NotificationLevel::Success)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_add_leaves_cart_untouched() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_add_to_cart()
            .once()
            .return_once(|_| Err(server_error("Out of stock")));

        let (store, notifications) = loaded_store(api, make_cart(vec![cart_line(1, 1, 10)])).await?;

        let result = store
            .add_to_cart(ProductId::new(9), 1, AttributeSelections::new())
            .await;

        assert!(result.is_err(), "expected failure");
        assert_eq!(store.lines(), vec![cart_line(1, 1, 10)]);
        assert_eq!(notifications.drain(), vec![Notification::error("Out of stock")]);

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_coupon_is_rejected() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_apply_coupon().never();

        let (store, _) = cart_store(api);

        let result = store.apply_coupon("   ").await;

        assert!(
            matches!(&result, Err(CartStoreError::Validation(errors)) if errors.for_field(Field::CouponCode).is_some()),
            "expected coupon validation error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_adopts_server_discount() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_apply_coupon()
            .once()
            .withf(|code| code == "SAVE10")
            .return_once(|_| Ok(()));

        api.expect_get_cart().once().return_once(|| {
            Ok(Cart {
                lines: vec![cart_line(1, 2, 50)],
                order_discount: Decimal::from(10),
            })
        });

        let (store, _) = cart_store(api);

        store.apply_coupon(" SAVE10 ").await?;

        assert_eq!(store.discount(), Decimal::from(10));
        assert_eq!(store.total(), Decimal::from(90));

        Ok(())
    }
}
