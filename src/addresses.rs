//! Addresses

use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    validation::{Field, ValidationErrors},
};

/// Address id
pub type AddressId = TypedId<Address>;

/// A saved shipping/billing address owned by the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Server id.
    pub id: AddressId,

    /// Customer-facing label ("Home", "Office").
    pub label: String,

    /// Contact phone.
    pub phone_number: String,

    /// Street line.
    pub address1: String,

    /// Details line.
    pub address2: String,

    /// Building number.
    pub building_no: String,

    /// Apartment number.
    pub apartment_no: String,

    /// Floor number.
    pub floor_no: String,

    /// City.
    pub city: String,
}

/// Address fields as submitted from the address form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressForm {
    /// Customer-facing label.
    pub label: String,

    /// Contact phone.
    pub phone_number: String,

    /// Street line.
    pub address1: String,

    /// Details line.
    pub address2: String,

    /// Building number.
    pub building_no: String,

    /// Apartment number.
    pub apartment_no: String,

    /// Floor number.
    pub floor_no: String,

    /// City.
    pub city: String,
}

impl AddressForm {
    /// Check the fields the backend requires before persisting.
    ///
    /// # Errors
    ///
    /// Returns field errors for a blank street, details line or phone number.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require(Field::Street, &self.address1, "Street is required");
        errors.require(Field::Details, &self.address2, "Address details are required");
        errors.require(Field::PhoneNumber, &self.phone_number, "Phone number is required");

        errors.into_result()
    }

    /// Attach the server id to produce the saved address.
    #[must_use]
    pub fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            label: self.label,
            phone_number: self.phone_number,
            address1: self.address1,
            address2: self.address2,
            building_no: self.building_no,
            apartment_no: self.apartment_no,
            floor_no: self.floor_no,
            city: self.city,
        }
    }
}

impl From<&Address> for AddressForm {
    fn from(address: &Address) -> Self {
        Self {
            label: address.label.clone(),
            phone_number: address.phone_number.clone(),
            address1: address.address1.clone(),
            address2: address.address2.clone(),
            building_no: address.building_no.clone(),
            apartment_no: address.apartment_no.clone(),
            floor_no: address.floor_no.clone(),
            city: address.city.clone(),
        }
    }
}
