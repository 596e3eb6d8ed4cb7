//! Storefront client.
//!
//! The commerce API client, the cart, address book and order history stores,
//! and the checkout controller layered over them.

pub mod api;
pub mod checkout;
pub mod config;
pub mod context;
pub mod logging;
pub mod notifications;
pub mod session;
pub mod stores;

#[cfg(test)]
mod test;
