//! Storefront
//!
//! Domain rules for a storefront client: cart lines and totals, product
//! attribute selection, saved addresses, the checkout session state machine and
//! read-only order views. Nothing in this crate talks to the network.

pub mod addresses;
pub mod attributes;
pub mod cart;
pub mod checkout;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod validation;
