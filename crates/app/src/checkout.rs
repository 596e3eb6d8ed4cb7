//! Checkout step controller.
//!
//! Drives a [`CheckoutSession`] through `Cart → Items → PersonalInfo →
//! PaymentMethod`, issuing the remote calls each transition needs. Cart and
//! address data are read from their stores, never written here, except for
//! the cart refresh after an order is placed.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use storefront::{
    addresses::AddressId,
    checkout::{
        CheckoutSession, CheckoutStep, PaymentMethod, PersonalInfo, TransitionError,
        billing_address, can_advance_from_personal_info,
    },
    orders::OrderId,
    validation::{ValidationErrors, is_blank},
};

use crate::{
    api::{ApiError, CommerceApi},
    notifications::{Notification, Notifier},
    session::{Credentials, Session},
    stores::{AddressBookStore, CartStore, read, write},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("invalid checkout details: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("no sign-in is pending")]
    NoPendingSignIn,
}

/// In-flight remote calls, one flag per call kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "independent flags shown next to separate buttons"
)]
pub struct CheckoutLoading {
    pub login: bool,
    pub billing: bool,
    pub payment_method: bool,
    pub confirm: bool,
}

impl CheckoutLoading {
    #[must_use]
    pub fn any(self) -> bool {
        self.login || self.billing || self.payment_method || self.confirm
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutState {
    pub session: CheckoutSession,
    pub loading: CheckoutLoading,
    pub error: Option<String>,

    /// Method the backend has accepted for the current session.
    pub submitted_payment_method: Option<PaymentMethod>,

    /// `go_to_checkout` is waiting for the customer to sign in or skip.
    pub awaiting_sign_in: bool,
}

/// Result of [`CheckoutController::go_to_checkout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoToCheckout {
    /// Moved to the items step.
    Started,

    /// The customer should sign in first, or skip it to continue as a guest.
    SignInRequired,
}

/// Result of [`CheckoutController::sign_in`].
#[derive(Debug, PartialEq, Eq)]
pub enum SignInOutcome {
    /// No checkout was waiting on the sign-in.
    SignedIn,

    /// The pending checkout moved to the items step.
    CheckoutResumed,

    /// Signed in, but the pending checkout could not start.
    CheckoutBlocked(TransitionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: Option<OrderId>,
}

/// Result of [`CheckoutController::confirm_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    OrderPlaced(PlacedOrder),

    /// The backend did not complete the order. The session is kept.
    NotCompleted { redirect: Option<String> },
}

pub struct CheckoutController {
    api: Arc<dyn CommerceApi>,
    session: Arc<Session>,
    cart: Arc<CartStore>,
    addresses: Arc<AddressBookStore>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<CheckoutState>,
}

impl fmt::Debug for CheckoutController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutController")
            .field("state", &*read(&self.state))
            .finish_non_exhaustive()
    }
}

impl CheckoutController {
    #[must_use]
    pub fn new(
        api: Arc<dyn CommerceApi>,
        session: Arc<Session>,
        cart: Arc<CartStore>,
        addresses: Arc<AddressBookStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            session,
            cart,
            addresses,
            notifier,
            state: RwLock::new(CheckoutState::default()),
        }
    }

    /// Leave the cart for the items step.
    ///
    /// Guests are asked to sign in first; the transition happens once they
    /// do, or once they skip it.
    pub fn go_to_checkout(&self) -> Result<GoToCheckout, CheckoutError> {
        let cart_is_empty = self.cart.is_empty();
        let mut state = write(&self.state);

        if self.session.is_authenticated() {
            state.session.begin(cart_is_empty)?;
            state.awaiting_sign_in = false;

            info!("checkout started");

            return Ok(GoToCheckout::Started);
        }

        state.session.clone().begin(cart_is_empty)?;
        state.awaiting_sign_in = true;

        debug!("checkout waiting for sign-in");

        Ok(GoToCheckout::SignInRequired)
    }

    /// Sign in, refresh the address book and resume a pending checkout.
    ///
    /// Fails only when the sign-in itself fails. A pending checkout that can
    /// no longer start is reported through the outcome.
    pub async fn sign_in(
        &self,
        credentials: Credentials,
    ) -> Result<SignInOutcome, CheckoutError> {
        self.login(credentials).await?;

        let cart_is_empty = self.cart.is_empty();
        let mut state = write(&self.state);

        if !state.awaiting_sign_in {
            return Ok(SignInOutcome::SignedIn);
        }

        state.awaiting_sign_in = false;

        match state.session.begin(cart_is_empty) {
            Ok(()) => {
                info!("checkout started after sign-in");

                Ok(SignInOutcome::CheckoutResumed)
            }
            Err(error) => {
                warn!(%error, "checkout could not start after sign-in");

                Ok(SignInOutcome::CheckoutBlocked(error))
            }
        }
    }

    /// Skip the sign-in prompt and continue as a guest.
    pub fn abandon_sign_in(&self) -> Result<(), CheckoutError> {
        let mut state = write(&self.state);

        if !state.awaiting_sign_in {
            return Err(CheckoutError::NoPendingSignIn);
        }

        state.awaiting_sign_in = false;
        state.session.begin(self.cart.is_empty())?;

        info!("checkout started as guest");

        Ok(())
    }

    /// `Items → PersonalInfo`.
    pub fn next(&self) -> Result<(), CheckoutError> {
        write(&self.state).session.continue_to_personal_info()?;

        Ok(())
    }

    pub fn select_address(&self, address: AddressId) {
        write(&self.state).session.select_address(address);
    }

    pub fn use_new_address(&self) {
        write(&self.state).session.use_new_address();
    }

    /// Whether `info` is enough to leave the personal-info step.
    #[must_use]
    pub fn can_advance(&self, info: &PersonalInfo) -> bool {
        can_advance_from_personal_info(&read(&self.state).session, info)
    }

    /// Submit contact details and the billing address, then move to payment.
    ///
    /// With a password, the customer is signed in first and nothing else
    /// happens unless that succeeds.
    pub async fn submit_personal_info(
        &self,
        info: &PersonalInfo,
        password: Option<&str>,
    ) -> Result<(), CheckoutError> {
        {
            let state = read(&self.state);

            if state.session.step != CheckoutStep::PersonalInfo {
                return Err(TransitionError::WrongStep {
                    expected: CheckoutStep::PersonalInfo,
                    actual: state.session.step,
                }
                .into());
            }

            state.session.validate_personal_info(info)?;
        }

        if let Some(password) = password.filter(|password| !is_blank(password)) {
            self.login(Credentials::new(info.email.trim(), password))
                .await?;
        }

        let billing = {
            let session = read(&self.state).session.clone();
            let saved = session
                .selected_address_id
                .filter(|_| session.has_selected_address())
                .and_then(|id| self.addresses.address(id));

            billing_address(&session, info, saved.as_ref())?
        };

        write(&self.state).loading.billing = true;

        let result = self.api.submit_billing_address(billing).await;

        write(&self.state).loading.billing = false;

        result.map_err(|error| self.fail("submit_billing_address", error))?;

        let mut state = write(&self.state);
        state.session.continue_to_payment(info)?;
        state.error = None;

        info!("billing address submitted");

        Ok(())
    }

    /// Record `method` and send it to the backend unless it already has it
    /// or is receiving it.
    pub async fn select_payment_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        {
            let mut state = write(&self.state);

            if state.session.step != CheckoutStep::PaymentMethod {
                return Err(TransitionError::WrongStep {
                    expected: CheckoutStep::PaymentMethod,
                    actual: state.session.step,
                }
                .into());
            }

            if state.submitted_payment_method == Some(method) {
                debug!(method = method.system_name(), "payment method already submitted");
                return Ok(());
            }

            if state.loading.payment_method && state.session.payment_method == Some(method) {
                debug!(method = method.system_name(), "payment method already in flight");
                return Ok(());
            }

            state.session.payment_method = Some(method);
            state.loading.payment_method = true;
        }

        let result = self.api.select_payment_method(method).await;

        write(&self.state).loading.payment_method = false;

        result.map_err(|error| self.fail("select_payment_method", error))?;

        let mut state = write(&self.state);
        state.submitted_payment_method = Some(method);
        state.error = None;

        info!(method = method.system_name(), "payment method selected");

        Ok(())
    }

    /// Place the order.
    pub async fn confirm_order(&self) -> Result<ConfirmOutcome, CheckoutError> {
        let method = {
            let state = read(&self.state);

            if state.session.step != CheckoutStep::PaymentMethod {
                return Err(TransitionError::WrongStep {
                    expected: CheckoutStep::PaymentMethod,
                    actual: state.session.step,
                }
                .into());
            }

            state
                .session
                .payment_method
                .unwrap_or(PaymentMethod::CashOnDelivery)
        };

        self.select_payment_method(method).await?;

        write(&self.state).loading.confirm = true;

        let result = self.api.confirm_order().await;

        write(&self.state).loading.confirm = false;

        let confirmation = result.map_err(|error| self.fail("confirm_order", error))?;

        if !confirmation.is_completed() {
            info!(redirect = ?confirmation.redirect, "order not completed");

            self.notifier.notify(Notification::info(
                "Your order could not be completed. Please review your details.",
            ));

            return Ok(ConfirmOutcome::NotCompleted {
                redirect: confirmation.redirect,
            });
        }

        self.leave();

        info!(order = ?confirmation.order_id, "order placed");

        self.notifier
            .notify(Notification::success("Your order has been placed"));

        if let Err(error) = self.cart.fetch_cart_items().await {
            warn!(%error, "cart refresh after order failed");
        }

        Ok(ConfirmOutcome::OrderPlaced(PlacedOrder {
            order_id: confirmation.order_id,
        }))
    }

    /// Step back once. Returns `false` at the cart step.
    pub fn back(&self) -> bool {
        write(&self.state).session.back()
    }

    /// Abandon checkout.
    pub fn leave(&self) {
        *write(&self.state) = CheckoutState::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> CheckoutState {
        read(&self.state).clone()
    }

    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        read(&self.state).session.step
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        read(&self.state).loading.any()
    }

    async fn login(&self, credentials: Credentials) -> Result<(), CheckoutError> {
        write(&self.state).loading.login = true;

        let result = self.api.login(credentials).await;

        write(&self.state).loading.login = false;

        let token = result.map_err(|error| self.fail("login", error))?;

        self.session.sign_in(token);

        info!("customer signed in");

        if let Err(error) = self.addresses.fetch_addresses().await {
            warn!(%error, "address refresh after sign-in failed");
        }

        Ok(())
    }

    fn fail(&self, operation: &'static str, error: ApiError) -> CheckoutError {
        let message = error.user_message();

        warn!(operation, %error, "checkout request failed");

        if error.is_unauthorized() && self.session.is_authenticated() {
            warn!("customer token rejected, continuing as guest");

            self.session.sign_out();
        }

        write(&self.state).error = Some(message.clone());
        self.notifier.notify(Notification::error(message));

        error.into()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use storefront::{checkout::NewAddress, validation::Field};

    use crate::{
        api::{MockCommerceApi, OrderConfirmation},
        notifications::NotificationQueue,
        session::CustomerToken,
        stores::AssumeYes,
        test::{YieldingApi, cart_line, make_address, make_cart, personal_info, server_error},
    };

    use super::*;

    struct Harness {
        controller: CheckoutController,
        session: Arc<Session>,
        cart: Arc<CartStore>,
        notifications: Arc<NotificationQueue>,
    }

    /// The cart store gets its own mock: one line on the first fetch, empty
    /// afterwards, as after a placed order.
    async fn harness(api: MockCommerceApi, session: Session) -> TestResult<Harness> {
        harness_with(Arc::new(api), session).await
    }

    async fn harness_with(api: Arc<dyn CommerceApi>, session: Session) -> TestResult<Harness> {
        let mut cart_api = MockCommerceApi::new();
        let mut fetches = 0;

        cart_api.expect_get_cart().returning(move || {
            fetches += 1;

            if fetches == 1 {
                Ok(make_cart(vec![cart_line(42, 2, 50)]))
            } else {
                Ok(make_cart(Vec::new()))
            }
        });

        let notifications = Arc::new(NotificationQueue::new());
        let session = Arc::new(session);

        let cart = Arc::new(CartStore::new(Arc::new(cart_api), notifications.clone()));
        let addresses = Arc::new(AddressBookStore::new(
            api.clone(),
            notifications.clone(),
            Arc::new(AssumeYes),
        ));

        cart.fetch_cart_items().await?;

        Ok(Harness {
            controller: CheckoutController::new(
                api,
                session.clone(),
                cart.clone(),
                addresses,
                notifications.clone(),
            ),
            session,
            cart,
            notifications,
        })
    }

    fn signed_in() -> Session {
        Session::signed_in("guest", CustomerToken::new("customer"))
    }

    async fn at_personal_info(api: MockCommerceApi) -> TestResult<Harness> {
        let harness = harness(api, signed_in()).await?;

        harness.controller.go_to_checkout()?;
        harness.controller.next()?;

        Ok(harness)
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_start_checkout() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_get_cart().once().return_once(|| Ok(make_cart(Vec::new())));

        let api: Arc<dyn CommerceApi> = Arc::new(api);
        let notifications = Arc::new(NotificationQueue::new());
        let cart = Arc::new(CartStore::new(api.clone(), notifications.clone()));
        let addresses = Arc::new(AddressBookStore::new(
            api.clone(),
            notifications.clone(),
            Arc::new(AssumeYes),
        ));

        cart.fetch_cart_items().await?;

        let controller =
            CheckoutController::new(api, Arc::new(signed_in()), cart, addresses, notifications);

        let result = controller.go_to_checkout();

        assert!(
            matches!(result, Err(CheckoutError::Transition(TransitionError::EmptyCart))),
            "expected EmptyCart, got {result:?}"
        );
        assert_eq!(controller.step(), CheckoutStep::Cart);

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_is_asked_to_sign_in() -> TestResult {
        let harness = harness(MockCommerceApi::new(), Session::guest("guest")).await?;

        let outcome = harness.controller.go_to_checkout()?;

        assert_eq!(outcome, GoToCheckout::SignInRequired);
        assert_eq!(harness.controller.step(), CheckoutStep::Cart);

        harness.controller.abandon_sign_in()?;

        assert_eq!(harness.controller.step(), CheckoutStep::Items);
        assert!(!harness.session.is_authenticated());

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_resumes_checkout_and_refreshes_addresses() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .withf(|credentials| credentials.email == "ada@example.com")
            .return_once(|_| Ok(CustomerToken::new("customer")));
        api.expect_list_addresses()
            .once()
            .return_once(|| Ok(vec![make_address(1)]));

        let harness = harness(api, Session::guest("guest")).await?;

        harness.controller.go_to_checkout()?;

        let outcome = harness
            .controller
            .sign_in(Credentials::new("ada@example.com", "secret"))
            .await?;

        assert_eq!(outcome, SignInOutcome::CheckoutResumed);
        assert_eq!(harness.controller.step(), CheckoutStep::Items);
        assert!(harness.session.is_authenticated());
        assert_eq!(harness.session.bearer_token().as_str(), "customer");

        Ok(())
    }

    #[tokio::test]
    async fn test_sign_in_succeeds_when_cart_empties_meanwhile() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .return_once(|_| Ok(CustomerToken::new("customer")));
        api.expect_list_addresses().once().return_once(|| Ok(Vec::new()));

        let harness = harness(api, Session::guest("guest")).await?;

        harness.controller.go_to_checkout()?;
        harness.cart.fetch_cart_items().await?;

        let outcome = harness
            .controller
            .sign_in(Credentials::new("ada@example.com", "secret"))
            .await?;

        assert_eq!(
            outcome,
            SignInOutcome::CheckoutBlocked(TransitionError::EmptyCart)
        );
        assert!(harness.session.is_authenticated());
        assert_eq!(harness.controller.step(), CheckoutStep::Cart);
        assert!(!harness.controller.snapshot().awaiting_sign_in);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_sign_in_keeps_prompt() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .return_once(|_| Err(server_error("Wrong email or password")));
        api.expect_list_addresses().never();

        let harness = harness(api, Session::guest("guest")).await?;

        harness.controller.go_to_checkout()?;

        let result = harness
            .controller
            .sign_in(Credentials::new("ada@example.com", "wrong"))
            .await;

        assert!(result.is_err(), "expected failure");
        assert_eq!(harness.controller.step(), CheckoutStep::Cart);
        assert!(harness.controller.snapshot().awaiting_sign_in);
        assert!(!harness.controller.snapshot().loading.login);
        assert_eq!(
            harness.notifications.drain(),
            vec![Notification::error("Wrong email or password")]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_incomplete_new_address_blocks_without_request() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address().never();

        let harness = at_personal_info(api).await?;

        let info = PersonalInfo {
            new_address: NewAddress {
                floor_no: String::new(),
                ..personal_info().new_address
            },
            ..personal_info()
        };

        assert!(!harness.controller.can_advance(&info));

        let result = harness.controller.submit_personal_info(&info, None).await;

        assert!(
            matches!(&result, Err(CheckoutError::Validation(errors)) if errors.for_field(Field::FloorNo).is_some()),
            "expected floor validation error, got {result:?}"
        );
        assert_eq!(harness.controller.step(), CheckoutStep::PersonalInfo);

        Ok(())
    }

    #[tokio::test]
    async fn test_new_address_billing_payload() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address()
            .once()
            .withf(|billing| {
                billing.first_name == "Ada"
                    && billing.last_name == "Lovelace"
                    && billing.address1 == "Nile Street"
                    && billing.address2 == "Building 4, Floor 2, Apartment 8"
            })
            .return_once(|_| Ok(()));

        let harness = at_personal_info(api).await?;

        harness.controller.use_new_address();
        harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await?;

        assert_eq!(harness.controller.step(), CheckoutStep::PaymentMethod);

        Ok(())
    }

    #[tokio::test]
    async fn test_saved_address_supplies_billing_lines() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_login()
            .once()
            .return_once(|_| Ok(CustomerToken::new("customer")));
        api.expect_list_addresses()
            .once()
            .return_once(|| Ok(vec![make_address(5)]));
        api.expect_submit_billing_address()
            .once()
            .withf(|billing| billing.address1 == "5 Nile Street" && billing.city == "Cairo")
            .return_once(|_| Ok(()));

        let harness = harness(api, Session::guest("guest")).await?;

        harness.controller.go_to_checkout()?;
        harness.controller.abandon_sign_in()?;
        harness.controller.next()?;
        harness.controller.select_address(AddressId::new(5));

        let info = PersonalInfo {
            new_address: NewAddress::default(),
            ..personal_info()
        };

        assert!(harness.controller.can_advance(&info));

        harness
            .controller
            .submit_personal_info(&info, Some("secret"))
            .await?;

        assert_eq!(harness.controller.step(), CheckoutStep::PaymentMethod);
        assert!(harness.session.is_authenticated());

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_billing_submit_stays_on_step() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address()
            .once()
            .return_once(|_| Err(server_error("Invalid phone number")));

        let harness = at_personal_info(api).await?;

        let result = harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await;

        assert!(
            matches!(result, Err(CheckoutError::Api(_))),
            "expected api error, got {result:?}"
        );
        assert_eq!(harness.controller.step(), CheckoutStep::PersonalInfo);
        assert!(!harness.controller.is_busy());
        assert_eq!(
            harness.controller.snapshot().error.as_deref(),
            Some("Invalid phone number")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_customer_token_falls_back_to_guest() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address().once().return_once(|_| {
            Err(ApiError::Status {
                status: 401,
                message: None,
            })
        });

        let harness = at_personal_info(api).await?;

        let result = harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await;

        assert!(result.is_err(), "expected failure");
        assert!(!harness.session.is_authenticated());
        assert_eq!(harness.session.bearer_token().as_str(), "guest");

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_method_outside_payment_step_is_rejected() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_select_payment_method().never();

        let harness = harness(api, signed_in()).await?;

        for expected_step in [
            CheckoutStep::Cart,
            CheckoutStep::Items,
            CheckoutStep::PersonalInfo,
        ] {
            assert_eq!(harness.controller.step(), expected_step);

            let result = harness
                .controller
                .select_payment_method(PaymentMethod::CashOnDelivery)
                .await;

            assert!(
                matches!(
                    result,
                    Err(CheckoutError::Transition(TransitionError::WrongStep {
                        expected: CheckoutStep::PaymentMethod,
                        actual,
                    })) if actual == expected_step
                ),
                "expected WrongStep at {expected_step:?}, got {result:?}"
            );
            assert_eq!(harness.controller.snapshot().session.payment_method, None);

            match expected_step {
                CheckoutStep::Cart => {
                    harness.controller.go_to_checkout()?;
                }
                CheckoutStep::Items => harness.controller.next()?,
                _ => {}
            }
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_selections_send_one_request() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address().once().return_once(|_| Ok(()));
        api.expect_select_payment_method()
            .once()
            .withf(|method| *method == PaymentMethod::CashOnDelivery)
            .return_once(|_| Ok(()));

        let harness = harness_with(Arc::new(YieldingApi(api)), signed_in()).await?;

        harness.controller.go_to_checkout()?;
        harness.controller.next()?;
        harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await?;

        let (first, second) = tokio::join!(
            harness
                .controller
                .select_payment_method(PaymentMethod::CashOnDelivery),
            harness
                .controller
                .select_payment_method(PaymentMethod::CashOnDelivery),
        );

        first?;
        second?;

        assert_eq!(
            harness.controller.snapshot().submitted_payment_method,
            Some(PaymentMethod::CashOnDelivery)
        );
        assert!(!harness.controller.is_busy());

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_method_is_submitted_once() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address().once().return_once(|_| Ok(()));
        api.expect_select_payment_method()
            .once()
            .withf(|method| *method == PaymentMethod::CashOnDelivery)
            .return_once(|_| Ok(()));
        api.expect_confirm_order().once().return_once(|| {
            Ok(OrderConfirmation {
                redirect: Some("Completed".to_string()),
                order_id: Some(OrderId::new(99)),
            })
        });
        let harness = at_personal_info(api).await?;

        harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await?;
        harness
            .controller
            .select_payment_method(PaymentMethod::CashOnDelivery)
            .await?;
        harness
            .controller
            .select_payment_method(PaymentMethod::CashOnDelivery)
            .await?;

        let outcome = harness.controller.confirm_order().await?;

        assert_eq!(
            outcome,
            ConfirmOutcome::OrderPlaced(PlacedOrder {
                order_id: Some(OrderId::new(99)),
            })
        );
        assert_eq!(harness.controller.snapshot(), CheckoutState::default());
        assert!(harness.cart.is_empty(), "cart is refreshed after the order");

        Ok(())
    }

    #[tokio::test]
    async fn test_not_completed_keeps_session() -> TestResult {
        let mut api = MockCommerceApi::new();

        api.expect_submit_billing_address().once().return_once(|_| Ok(()));
        api.expect_select_payment_method().once().return_once(|_| Ok(()));
        api.expect_confirm_order().once().return_once(|| {
            Ok(OrderConfirmation {
                redirect: Some("PaymentInfo".to_string()),
                order_id: None,
            })
        });

        let harness = at_personal_info(api).await?;

        harness
            .controller
            .submit_personal_info(&personal_info(), None)
            .await?;

        let outcome = harness.controller.confirm_order().await?;

        assert_eq!(
            outcome,
            ConfirmOutcome::NotCompleted {
                redirect: Some("PaymentInfo".to_string()),
            }
        );
        assert_eq!(harness.controller.step(), CheckoutStep::PaymentMethod);
        assert_eq!(
            harness.controller.snapshot().session.payment_method,
            Some(PaymentMethod::CashOnDelivery)
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_back_walks_down_to_cart() -> TestResult {
        let harness = at_personal_info(MockCommerceApi::new()).await?;

        assert!(harness.controller.back());
        assert_eq!(harness.controller.step(), CheckoutStep::Items);
        assert!(harness.controller.back());
        assert!(!harness.controller.back());
        assert_eq!(harness.controller.step(), CheckoutStep::Cart);

        Ok(())
    }
}
