//! Prices

use rust_decimal::Decimal;
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

use crate::cart::CartLine;

/// Errors that can occur while formatting amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The ISO currency code is not known.
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),
}

/// Totals derived from a cart's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,

    /// Line discounts plus the cart-level discount.
    pub discount: Decimal,

    /// `subtotal - discount`, never below zero.
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals for `lines` with a cart-level `order_discount`.
    #[must_use]
    pub fn from_lines(lines: &[CartLine], order_discount: Decimal) -> Self {
        let subtotal = subtotal(lines);

        let discount = lines
            .iter()
            .fold(order_discount, |acc, line| acc + line.discount_value);

        let total = (subtotal - discount).max(Decimal::ZERO);

        Self {
            subtotal,
            discount,
            total,
        }
    }
}

/// Sum the server-supplied subtotals of `lines`.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .fold(Decimal::ZERO, |acc, line| acc + line.sub_total_value)
}

/// Look up an ISO currency by its alpha code.
///
/// # Errors
///
/// Returns [`PricingError::UnknownCurrency`] when the code is not an ISO currency.
pub fn currency(code: &str) -> Result<&'static Currency, PricingError> {
    Currency::find(code).ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))
}

/// Render `amount` in `currency`, e.g. `$1,500.00`.
#[must_use]
pub fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}
