//! Cart

use rust_decimal::Decimal;

use crate::{
    ids::TypedId,
    pricing::CartTotals,
    validation::{Field, ValidationErrors},
};

/// Smallest quantity a cart line may hold.
pub const MIN_QUANTITY: u32 = 1;

/// Catalog product marker.
#[derive(Debug)]
pub struct Product;

/// Product id
pub type ProductId = TypedId<Product>;

/// Cart line id, assigned by the server.
pub type CartLineId = TypedId<CartLine>;

/// One product line in the server cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Server-assigned line identity.
    pub id: CartLineId,

    /// The product this line holds.
    pub product_id: ProductId,

    /// Product display name.
    pub product_name: String,

    /// Product picture, when the server supplies one.
    pub image_url: Option<String>,

    /// Formatted unit price, as rendered by the server.
    pub unit_price: String,

    /// Numeric unit price.
    pub unit_price_value: Decimal,

    /// Formatted line subtotal, as rendered by the server.
    pub sub_total: String,

    /// Numeric line subtotal. Authoritative; never recomputed locally.
    pub sub_total_value: Decimal,

    /// Quantity, always at least [`MIN_QUANTITY`].
    pub quantity: u32,

    /// Discount applied to this line.
    pub discount_value: Decimal,
}

/// The server cart as last confirmed by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    /// Lines in server order.
    pub lines: Vec<CartLine>,

    /// Cart-level discount (coupons, order promotions).
    pub order_discount: Decimal,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// The line holding `product`, if any.
    #[must_use]
    pub fn line(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product)
    }

    /// Totals derived from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::from_lines(&self.lines, self.order_discount)
    }

    /// Replace the line for `line.product_id` in place.
    ///
    /// Returns `false` when the cart has no line for that product.
    pub fn replace_line(&mut self, line: CartLine) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|existing| existing.product_id == line.product_id)
        {
            Some(existing) => {
                *existing = line;
                true
            }
            None => false,
        }
    }

    /// Remove and return the line holding `product`.
    pub fn remove_line(&mut self, product: ProductId) -> Option<CartLine> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product_id == product)?;

        Some(self.lines.remove(idx))
    }
}

/// Check that `quantity` may be sent to the server.
///
/// # Errors
///
/// Returns a [`Field::Quantity`] error when `quantity` is below [`MIN_QUANTITY`].
pub fn validate_quantity(quantity: u32) -> Result<(), ValidationErrors> {
    if quantity < MIN_QUANTITY {
        return Err(ValidationErrors::single(
            Field::Quantity,
            "Quantity must be at least 1",
        ));
    }

    Ok(())
}
