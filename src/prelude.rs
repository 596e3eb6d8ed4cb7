//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addresses::{Address, AddressForm, AddressId},
    attributes::{
        AttributeId, AttributeSelection, AttributeSelections, AttributeValue, AttributeValueId,
        ProductAttribute, resolve_attributes, unique_selections,
    },
    cart::{Cart, CartLine, CartLineId, MIN_QUANTITY, ProductId, validate_quantity},
    checkout::{
        BillingAddress, CheckoutSession, CheckoutStep, NewAddress, PaymentMethod, PersonalInfo,
        TransitionError, billing_address, can_advance_from_personal_info, split_full_name,
    },
    ids::TypedId,
    orders::{OrderDetails, OrderId, OrderLine, OrderSummary},
    pricing::{CartTotals, PricingError, format_amount},
    receipt::{ReceiptError, write_cart},
    validation::{Field, FieldError, ValidationErrors},
};
