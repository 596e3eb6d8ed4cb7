//! Validation

use std::fmt::{self, Display, Formatter};

use smallvec::SmallVec;

/// Form fields that can carry an inline validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Customer full name.
    FullName,

    /// Contact phone number.
    PhoneNumber,

    /// Contact email address.
    Email,

    /// Street line (`address1`).
    Street,

    /// Details line (`address2`).
    Details,

    /// Building number.
    BuildingNo,

    /// Apartment number.
    ApartmentNo,

    /// Floor number.
    FloorNo,

    /// Saved-address selection or a new address.
    Address,

    /// Cart quantity.
    Quantity,

    /// Product attribute choice.
    Attribute,

    /// Discount coupon code.
    CouponCode,
}

impl Field {
    /// Stable name used when reporting the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::PhoneNumber => "phone_number",
            Self::Email => "email",
            Self::Street => "street",
            Self::Details => "details",
            Self::BuildingNo => "building_no",
            Self::ApartmentNo => "apartment_no",
            Self::FloorNo => "floor_no",
            Self::Address => "address",
            Self::Quantity => "quantity",
            Self::Attribute => "attribute",
            Self::CouponCode => "coupon_code",
        }
    }
}

/// A single inline validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The offending field.
    pub field: Field,

    /// Message shown beneath the field.
    pub message: &'static str,
}

/// Validation failures collected for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: SmallVec<[FieldError; 4]>,
}

impl ValidationErrors {
    /// Create an empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single error.
    #[must_use]
    pub fn single(field: Field, message: &'static str) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record an error against `field`.
    pub fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push(FieldError { field, message });
    }

    /// Record `message` against `field` when `value` is blank.
    pub fn require(&mut self, field: Field, value: &str, message: &'static str) {
        if is_blank(value) {
            self.push(field, message);
        }
    }

    /// The first message recorded against `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message)
    }

    /// All recorded errors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors when at least one was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (idx, error) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{}: {}", error.field.name(), error.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Whether a form value is empty once surrounding whitespace is ignored.
#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
