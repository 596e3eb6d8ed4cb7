//! Receipt
//!
//! Plain-text rendering of a cart for terminals.

use std::io;

use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, pricing::format_amount};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt")]
    Io(#[from] io::Error),
}

/// Write `cart` as a table followed by subtotal, discount and total lines.
///
/// Line prices are the server's formatted strings; totals are formatted in
/// `currency`.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] when writing to `out` fails.
pub fn write_cart(
    out: &mut impl io::Write,
    cart: &Cart,
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["#", "Product", "Qty", "Unit price", "Subtotal"]);

    for (idx, line) in cart.lines.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.product_name.clone(),
            line.quantity.to_string(),
            line.unit_price.clone(),
            line.sub_total.clone(),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')));

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}")?;

    let totals = cart.totals();

    let rows = [
        ("Subtotal:", format_amount(totals.subtotal, currency)),
        ("Discount:", format_amount(totals.discount, currency)),
        ("Total:", format_amount(totals.total, currency)),
    ];

    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in rows {
        writeln!(out, " {label:<10}{value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
