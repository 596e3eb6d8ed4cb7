//! Address book store.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use mockall::automock;
use thiserror::Error;
use tracing::{debug, info, warn};

use storefront::{
    addresses::{Address, AddressForm, AddressId},
    validation::ValidationErrors,
};

use crate::{
    api::{ApiError, CommerceApi},
    notifications::{Notification, Notifier},
    stores::{read, write},
};

const DELETE_PROMPT: &str = "Delete this address?";

#[derive(Debug, Error)]
pub enum AddressBookError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid address: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Asks the customer to confirm a destructive action.
#[automock]
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything. For non-interactive use.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBookState {
    pub addresses: Vec<Address>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub deleting: Option<AddressId>,
}

/// The customer's saved addresses.
pub struct AddressBookStore {
    api: Arc<dyn CommerceApi>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    state: RwLock<AddressBookState>,
}

impl fmt::Debug for AddressBookStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressBookStore")
            .field("state", &*read(&self.state))
            .finish_non_exhaustive()
    }
}

impl AddressBookStore {
    #[must_use]
    pub fn new(
        api: Arc<dyn CommerceApi>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            notifier,
            confirm,
            state: RwLock::new(AddressBookState::default()),
        }
    }

    pub async fn fetch_addresses(&self) -> Result<(), AddressBookError> {
        write(&self.state).is_loading = true;

        let result = self.api.list_addresses().await;

        let mut state = write(&self.state);
        state.is_loading = false;

        match result {
            Ok(addresses) => {
                debug!(count = addresses.len(), "addresses fetched");

                state.addresses = addresses;
                state.error = None;

                Ok(())
            }
            Err(error) => {
                drop(state);

                Err(self.fail("fetch_addresses", error))
            }
        }
    }

    /// Save a new address and append it to the list.
    pub async fn add_address(&self, form: AddressForm) -> Result<Address, AddressBookError> {
        form.validate()?;

        write(&self.state).is_loading = true;

        let result = self.api.add_address(form).await;

        write(&self.state).is_loading = false;

        let address = result.map_err(|error| self.fail("add_address", error))?;

        {
            let mut state = write(&self.state);
            state.addresses.push(address.clone());
            state.error = None;
        }

        info!(address = %address.id, "address added");

        self.notifier.notify(Notification::success("Address added"));

        Ok(address)
    }

    /// Update an address in place.
    pub async fn edit_address(
        &self,
        id: AddressId,
        form: AddressForm,
    ) -> Result<Address, AddressBookError> {
        form.validate()?;

        write(&self.state).is_loading = true;

        let result = self.api.edit_address(id, form).await;

        write(&self.state).is_loading = false;

        let address = result.map_err(|error| self.fail("edit_address", error))?;

        {
            let mut state = write(&self.state);

            match state.addresses.iter_mut().find(|existing| existing.id == id) {
                Some(existing) => *existing = address.clone(),
                None => state.addresses.push(address.clone()),
            }

            state.error = None;
        }

        info!(address = %id, "address updated");

        self.notifier.notify(Notification::success("Address updated"));

        Ok(address)
    }

    /// Delete an address after the customer confirms.
    ///
    /// Returns `false` when the customer declined.
    pub async fn delete_address(&self, id: AddressId) -> Result<bool, AddressBookError> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            debug!(address = %id, "address delete declined");
            return Ok(false);
        }

        {
            let mut state = write(&self.state);
            state.is_loading = true;
            state.deleting = Some(id);
        }

        let result = self.api.delete_address(id).await;

        self.finish_delete(id, result.is_ok());

        result.map_err(|error| self.fail("delete_address", error))?;

        info!(address = %id, "address deleted");

        self.notifier.notify(Notification::success("Address deleted"));

        Ok(true)
    }

    #[must_use]
    pub fn snapshot(&self) -> AddressBookState {
        read(&self.state).clone()
    }

    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        read(&self.state).addresses.clone()
    }

    #[must_use]
    pub fn address(&self, id: AddressId) -> Option<Address> {
        read(&self.state)
            .addresses
            .iter()
            .find(|address| address.id == id)
            .cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        read(&self.state).is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        read(&self.state).error.clone()
    }

    #[must_use]
    pub fn is_deleting(&self, id: AddressId) -> bool {
        read(&self.state).deleting == Some(id)
    }

    /// Clear the busy flag for `id` only; a later delete may own it by now.
    fn finish_delete(&self, id: AddressId, deleted: bool) {
        let mut state = write(&self.state);
        state.is_loading = false;

        if state.deleting == Some(id) {
            state.deleting = None;
        }

        if deleted {
            state.addresses.retain(|address| address.id != id);
            state.error = None;
        }
    }

    fn fail(&self, operation: &'static str, error: ApiError) -> AddressBookError {
        let message = error.user_message();

        warn!(operation, %error, "address request failed");

        write(&self.state).error = Some(message.clone());
        self.notifier.notify(Notification::error(message));

        error.into()
    }
}
