//! Bearer token session.
//!
//! Every request is signed with the guest token until a customer signs in,
//! after which the customer token is used.

use std::{
    fmt,
    sync::{PoisonError, RwLock},
};

use zeroize::Zeroizing;

/// Token issued to a signed-in customer.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomerToken(Zeroizing<String>);

impl CustomerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CustomerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomerToken(**redacted**)")
    }
}

/// Email and password for a customer sign-in.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

/// Current bearer token for API requests.
pub struct Session {
    guest_token: Zeroizing<String>,
    customer_token: RwLock<Option<CustomerToken>>,
}

impl Session {
    /// Start a guest session.
    #[must_use]
    pub fn guest(guest_token: impl Into<String>) -> Self {
        Self {
            guest_token: Zeroizing::new(guest_token.into()),
            customer_token: RwLock::new(None),
        }
    }

    /// Start a session that is already signed in.
    #[must_use]
    pub fn signed_in(guest_token: impl Into<String>, customer_token: CustomerToken) -> Self {
        Self {
            guest_token: Zeroizing::new(guest_token.into()),
            customer_token: RwLock::new(Some(customer_token)),
        }
    }

    /// The token to send with the next request.
    #[must_use]
    pub fn bearer_token(&self) -> Zeroizing<String> {
        let customer = self
            .customer_token
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match customer.as_ref() {
            Some(token) => Zeroizing::new(token.expose().to_string()),
            None => self.guest_token.clone(),
        }
    }

    /// Whether a customer is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.customer_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Switch to the customer's token.
    pub fn sign_in(&self, token: CustomerToken) {
        *self
            .customer_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Fall back to the guest token.
    pub fn sign_out(&self) {
        *self
            .customer_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
