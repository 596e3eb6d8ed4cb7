//! Checkout
//!
//! The client-side checkout session: a four-step sequence that only moves
//! forward once the current step's data is present, and moves back one step at
//! a time without touching the server.

use serde::Serialize;
use thiserror::Error;

use crate::{
    addresses::{Address, AddressId},
    validation::{Field, ValidationErrors, is_blank},
};

/// Checkout steps, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    /// Reviewing the cart.
    #[default]
    Cart = 0,

    /// Reviewing the items being ordered.
    Items = 1,

    /// Contact details and delivery address.
    PersonalInfo = 2,

    /// Choosing how to pay.
    PaymentMethod = 3,
}

impl CheckoutStep {
    /// Zero-based position of the step.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// The step before this one.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Cart => None,
            Self::Items => Some(Self::Cart),
            Self::PersonalInfo => Some(Self::Items),
            Self::PaymentMethod => Some(Self::PersonalInfo),
        }
    }
}

/// Supported payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    CashOnDelivery,
}

impl PaymentMethod {
    /// Backend system name of the payment plugin.
    #[must_use]
    pub const fn system_name(self) -> &'static str {
        match self {
            Self::CashOnDelivery => "Payments.CashOnDelivery",
        }
    }
}

/// Errors raised by an illegal checkout transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The action belongs to a different step.
    #[error("checkout is at {actual:?}, expected {expected:?}")]
    WrongStep {
        /// Step the action requires.
        expected: CheckoutStep,

        /// Step the session is at.
        actual: CheckoutStep,
    },

    /// Checkout cannot start with an empty cart.
    #[error("the cart is empty")]
    EmptyCart,

    /// Required details are missing.
    #[error("checkout details are incomplete: {0}")]
    Incomplete(ValidationErrors),
}

/// An address typed in during checkout instead of picking a saved one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAddress {
    /// Street line.
    pub street: String,

    /// Building number.
    pub building_no: String,

    /// Apartment number.
    pub apartment_no: String,

    /// Floor number.
    pub floor_no: String,

    /// Free-form delivery notes.
    pub notes: String,

    /// City.
    pub city: String,
}

impl NewAddress {
    /// Whether street, building, apartment and floor are all filled in.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.street,
            &self.building_no,
            &self.apartment_no,
            &self.floor_no,
        ]
        .into_iter()
        .all(|value| !is_blank(value))
    }

    /// Building, floor, apartment and notes folded into one line; the backend
    /// only stores two address lines.
    #[must_use]
    pub fn secondary_line(&self) -> String {
        let mut line = format!(
            "Building {}, Floor {}, Apartment {}",
            self.building_no.trim(),
            self.floor_no.trim(),
            self.apartment_no.trim()
        );

        if !is_blank(&self.notes) {
            line.push_str(", ");
            line.push_str(self.notes.trim());
        }

        line
    }
}

/// The personal-info step form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfo {
    /// Full name, split into first/last on submission.
    pub full_name: String,

    /// Contact phone.
    pub phone_number: String,

    /// Contact email.
    pub email: String,

    /// Address entered inline, used when no saved address is selected.
    pub new_address: NewAddress,
}

/// Progress through checkout. Local to the client and discarded on completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Current step.
    pub step: CheckoutStep,

    /// Saved address picked in the personal-info step.
    pub selected_address_id: Option<AddressId>,

    /// Whether the customer chose to enter a new address.
    pub is_new_address: bool,

    /// Chosen payment method.
    pub payment_method: Option<PaymentMethod>,
}

impl CheckoutSession {
    /// A session at the cart step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), TransitionError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(TransitionError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// `Cart -> Items`.
    ///
    /// # Errors
    ///
    /// Fails when not at the cart step or when the cart is empty.
    pub fn begin(&mut self, cart_is_empty: bool) -> Result<(), TransitionError> {
        self.expect_step(CheckoutStep::Cart)?;

        if cart_is_empty {
            return Err(TransitionError::EmptyCart);
        }

        self.step = CheckoutStep::Items;

        Ok(())
    }

    /// `Items -> PersonalInfo`.
    ///
    /// # Errors
    ///
    /// Fails when not at the items step.
    pub fn continue_to_personal_info(&mut self) -> Result<(), TransitionError> {
        self.expect_step(CheckoutStep::Items)?;

        self.step = CheckoutStep::PersonalInfo;

        Ok(())
    }

    /// `PersonalInfo -> PaymentMethod`.
    ///
    /// # Errors
    ///
    /// Fails when not at the personal-info step or when `info` is incomplete.
    pub fn continue_to_payment(&mut self, info: &PersonalInfo) -> Result<(), TransitionError> {
        self.expect_step(CheckoutStep::PersonalInfo)?;

        self.validate_personal_info(info)
            .map_err(TransitionError::Incomplete)?;

        self.step = CheckoutStep::PaymentMethod;

        Ok(())
    }

    /// Step back once. Returns `false` at the cart step.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                true
            }
            None => false,
        }
    }

    /// Discard all progress.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Pick a saved address.
    pub fn select_address(&mut self, address: AddressId) {
        self.selected_address_id = Some(address);
        self.is_new_address = false;
    }

    /// Switch to entering a new address.
    pub fn use_new_address(&mut self) {
        self.is_new_address = true;
    }

    /// Whether a saved address is selected and not overridden by a new one.
    #[must_use]
    pub fn has_selected_address(&self) -> bool {
        self.selected_address_id.is_some() && !self.is_new_address
    }

    /// Field-level checks for the personal-info step.
    ///
    /// # Errors
    ///
    /// Returns every missing contact field and, unless a saved address is
    /// selected, every missing new-address field.
    pub fn validate_personal_info(&self, info: &PersonalInfo) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require(Field::FullName, &info.full_name, "Full name is required");
        errors.require(Field::PhoneNumber, &info.phone_number, "Phone number is required");
        errors.require(Field::Email, &info.email, "Email is required");

        if !self.has_selected_address() {
            let address = &info.new_address;

            errors.require(Field::Street, &address.street, "Street is required");
            errors.require(Field::BuildingNo, &address.building_no, "Building is required");
            errors.require(Field::ApartmentNo, &address.apartment_no, "Apartment is required");
            errors.require(Field::FloorNo, &address.floor_no, "Floor is required");
        }

        errors.into_result()
    }
}

/// Whether the personal-info step may advance.
#[must_use]
pub fn can_advance_from_personal_info(session: &CheckoutSession, info: &PersonalInfo) -> bool {
    session.validate_personal_info(info).is_ok()
}

/// Billing address payload submitted when leaving the personal-info step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillingAddress {
    /// First token of the full name.
    pub first_name: String,

    /// Remainder of the full name.
    pub last_name: String,

    /// Contact email.
    pub email: String,

    /// Contact phone.
    pub phone_number: String,

    /// Street line.
    pub address1: String,

    /// Secondary line.
    pub address2: String,

    /// City.
    pub city: String,
}

/// Split at the first whitespace: first token is the first name, the trimmed
/// remainder (possibly empty) the last name.
#[must_use]
pub fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();

    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// Build the billing payload for `info`.
///
/// With a saved address selected, `saved` supplies the address lines, city
/// and (when set) the phone number; otherwise the new address is used.
///
/// # Errors
///
/// Returns a [`Field::Address`] error when a saved address is selected but
/// `saved` is missing or refers to a different address.
pub fn billing_address(
    session: &CheckoutSession,
    info: &PersonalInfo,
    saved: Option<&Address>,
) -> Result<BillingAddress, ValidationErrors> {
    let (first_name, last_name) = split_full_name(&info.full_name);

    let contact = BillingAddress {
        first_name,
        last_name,
        email: info.email.trim().to_string(),
        phone_number: info.phone_number.trim().to_string(),
        ..BillingAddress::default()
    };

    if session.has_selected_address() {
        let Some(address) = saved.filter(|address| Some(address.id) == session.selected_address_id)
        else {
            return Err(ValidationErrors::single(
                Field::Address,
                "The selected address is no longer available",
            ));
        };

        let phone_number = if is_blank(&address.phone_number) {
            contact.phone_number.clone()
        } else {
            address.phone_number.clone()
        };

        return Ok(BillingAddress {
            phone_number,
            address1: address.address1.clone(),
            address2: address.address2.clone(),
            city: address.city.clone(),
            ..contact
        });
    }

    let address = &info.new_address;

    Ok(BillingAddress {
        address1: address.street.trim().to_string(),
        address2: address.secondary_line(),
        city: address.city.trim().to_string(),
        ..contact
    })
}
